use crate::{
    maud_conveniences::title,
    routes::students::render_students,
    state::{PAGE_HEADER, PageId, RosterState},
};
use axum::extract::State;
use maud::{Markup, html};

pub async fn get_index_route(State(state): State<RosterState>) -> Markup {
    let id = PageId::new();
    let students = render_students(&state.page(id).await.view().await);

    state.render(html! {
        div hx-headers={"{\"" (PAGE_HEADER) "\": \"" (id) "\"}"} class="mx-auto bg-gray-800 p-8 rounded shadow-md max-w-5xl w-full flex flex-col space-y-4" {
            (title("Students"))

            div sse-connect={"/sse_feed?page=" (id)} {
                div id="toasts" sse-swap="toast" hx-swap="beforeend" class="fixed top-4 right-4 w-80 z-50" {}
            }

            div id="students" hx-get="/internal/students" hx-trigger="load" {
                (students)
            }
        }
    })
}
