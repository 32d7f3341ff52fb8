use maud::{Markup, Render, html};

pub fn render_table<const N: usize>(
    titles: [&'static str; N],
    items: Vec<[Markup; N]>,
) -> Markup {
    html! {
        div class="overflow-x-auto max-h-[500px] overflow-y-auto" {
            table class="min-w-full bg-gray-800 rounded shadow-md" {
                thead class="bg-gray-700" {
                    tr {
                        @for title in titles {
                            th class="py-2 px-4 text-left font-semibold text-gray-300" {(title)}
                        }
                    }
                }
                tbody {
                    @for row in items {
                        tr {
                            @for col in row {
                                td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

/// A labelled form control, with the inline validation message underneath if there is one.
pub fn form_element(
    id: &'static str,
    label: &'static str,
    error: Option<&str>,
    control: Markup,
) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            (control)
            @if let Some(error) = error {
                p class="text-red-400 text-xs italic mt-1" {(error)}
            }
        }
    }
}

pub fn text_input(id: &'static str, placeholder: &'static str, value: &str) -> Markup {
    html! {
        input type="text" id=(id) name=(id) value=(value) placeholder=(placeholder) class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";
    }
}

/// With an id this only shows while htmx has a request in flight; without one it always shows.
pub fn spinner(indicator_id: Option<&'static str>) -> Markup {
    let class = if indicator_id.is_some() {
        "htmx-indicator flex justify-center py-4"
    } else {
        "flex justify-center py-4"
    };

    html! {
        div id=[indicator_id] class=(class) role="status" {
            div class="animate-spin rounded-full h-6 w-6 border-b-2 border-blue-400" {}
        }
    }
}
