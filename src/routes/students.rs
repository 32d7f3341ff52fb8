use crate::{
    data::{
        IdForm,
        student::{Avatar, StudentId},
    },
    error::RosterResult,
    maud_conveniences::{render_table, spinner},
    page::{PageView, Phase},
    routes::student_form::render_drawer,
    state::CurrentPage,
};
use axum::extract::Query;
use maud::{Markup, Render, html};
use serde::Deserialize;

fn add_student_button() -> Markup {
    html! {
        button class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded-full text-sm" hx-get="/internal/students/new_form" hx-target="#students" {
            "+ Add New Student"
        }
    }
}

fn row_actions(id: StudentId) -> Markup {
    html! {
        div class="flex flex-row space-x-2" {
            button class="bg-red-600 hover:bg-red-800 py-1 px-3 rounded text-sm" hx-get="/internal/students/confirm_delete" hx-vals={"{\"id\": " (id) "}"} hx-target="#in_focus" {
                "Delete"
            }
            button class="bg-gray-600 hover:bg-gray-500 py-1 px-3 rounded text-sm" hx-get="/internal/students/edit_form" hx-vals={"{\"id\": " (id) "}"} hx-target="#students" {
                "Edit"
            }
        }
    }
}

/// Everything inside `#students`: a spinner while the first fetch is out, otherwise the
/// drawer (if open) over either the empty state or the table.
pub fn render_students(view: &PageView) -> Markup {
    let phase = view.phase();
    debug!(?phase, "Rendering students");
    if phase == Phase::Loading {
        return spinner(None);
    }

    let rows = view
        .records
        .iter()
        .map(|student| {
            [
                Avatar(&student.name).render(),
                html! {(student.id)},
                html! {(student.name)},
                html! {(student.email)},
                student.gender.render(),
                row_actions(student.id),
            ]
        })
        .collect::<Vec<_>>();

    html! {
        div id="in_focus" {}

        @if let Some(session) = &view.form {
            (render_drawer(session))
        }

        @if rows.is_empty() {
            div id="empty_state" class="flex flex-col items-center space-y-4 py-8 text-gray-400" {
                p {"No students yet"}
                (add_student_button())
            }
        } @else {
            div class="flex flex-row items-center justify-between mb-4" {
                (add_student_button())
                span id="total" class="bg-green-800 text-green-100 rounded px-3 py-1 text-sm" {
                    "Total "
                    span class="font-bold" {(rows.len())}
                }
            }
            (render_table(["", "Id", "Name", "Email", "Gender", "Actions"], rows))
        }
    }
}

pub async fn internal_get_students(page: CurrentPage) -> Markup {
    page.refresh().await;
    render_students(&page.view().await)
}

pub async fn internal_get_new_student_form(page: CurrentPage) -> Markup {
    page.request_create().await;
    render_students(&page.view().await)
}

pub async fn internal_get_edit_student_form(
    page: CurrentPage,
    Query(IdForm { id }): Query<IdForm>,
) -> RosterResult<Markup> {
    page.request_edit(id).await?;
    Ok(render_students(&page.view().await))
}

pub async fn internal_get_confirm_delete(
    page: CurrentPage,
    Query(IdForm { id }): Query<IdForm>,
) -> RosterResult<Markup> {
    let student = page.find(id).await?;

    Ok(html! {
        div class="bg-gray-700 rounded shadow-md p-4 mb-4 flex flex-row items-center justify-between" {
            p {"Are you sure to delete " (student.name) "?"}
            div class="flex flex-row space-x-2" {
                button class="bg-red-600 hover:bg-red-800 py-1 px-3 rounded" hx-delete="/students" hx-vals={"{\"id\": " (id) ", \"confirmed\": true}"} hx-target="#students" {
                    "Yes"
                }
                button class="bg-gray-600 hover:bg-gray-500 py-1 px-3 rounded" hx-delete="/students" hx-vals={"{\"id\": " (id) ", \"confirmed\": false}"} hx-target="#students" {
                    "No"
                }
            }
        }
    })
}

#[derive(Deserialize)]
pub struct DeleteQuery {
    id: StudentId,
    #[serde(default)]
    confirmed: bool,
}

pub async fn delete_student(
    page: CurrentPage,
    Query(DeleteQuery { id, confirmed }): Query<DeleteQuery>,
) -> Markup {
    page.request_delete(id, confirmed.into()).await;
    render_students(&page.view().await)
}
