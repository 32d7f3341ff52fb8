use crate::{
    data::student::Gender,
    form::{DraftFields, FormSession},
    maud_conveniences::{form_element, spinner, text_input, title},
    page::SessionToken,
    routes::students::render_students,
    state::CurrentPage,
};
use axum::Form;
use maud::{Markup, html};
use serde::Deserialize;

/// The slide-out drawer for one form session. Submitting re-renders the whole `#students` region.
pub fn render_drawer(session: &FormSession) -> Markup {
    let gender_select = html! {
        select id="gender" name="gender" class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600" {
            option value="" selected[session.fields.gender.is_empty()] {"Please select a gender"}
            @for gender in Gender::ALL {
                option value=(gender.as_str()) selected[session.fields.gender == gender.as_str()] {(gender)}
            }
        }
    };

    html! {
        div id="drawer" class="fixed top-0 right-0 h-full w-full max-w-xl bg-gray-800 shadow-lg p-6 overflow-y-auto z-40" {
            (title(session.title()))

            form hx-post="/internal/students/form" hx-trigger="submit" hx-target="#students" hx-indicator="#form_spinner" class="p-4" {
                input type="hidden" name="session" value=(session.token.value());

                div class="grid grid-cols-2 gap-4" {
                    (form_element("name", "Name", session.error_for("name"), text_input("name", "Please enter student name", &session.fields.name)))
                    (form_element("email", "Email", session.error_for("email"), text_input("email", "Please enter student email", &session.fields.email)))
                    (form_element("gender", "Gender", session.error_for("gender"), gender_select))
                }

                div class="flex items-center justify-between" {
                    button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
                        "Submit"
                    }
                }

                @if session.submitting {
                    (spinner(None))
                }
                (spinner(Some("form_spinner")))
            }

            div class="flex justify-end" {
                button class="bg-gray-700 hover:bg-gray-600 text-gray-300 font-bold py-2 px-4 rounded" hx-post="/internal/students/form/close" hx-target="#students" {
                    "Cancel"
                }
            }
        }
    }
}

#[derive(Deserialize)]
pub struct StudentForm {
    session: SessionToken,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    gender: String,
}

pub async fn internal_post_student_form(
    page: CurrentPage,
    Form(form): Form<StudentForm>,
) -> Markup {
    let draft = DraftFields {
        name: form.name,
        email: form.email,
        gender: form.gender,
    };

    let outcome = page.submit(form.session, draft).await;
    debug!(?outcome, "Handled student form");

    render_students(&page.view().await)
}

pub async fn internal_post_close_student_form(page: CurrentPage) -> Markup {
    page.close().await;
    render_students(&page.view().await)
}
