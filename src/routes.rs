use crate::{
    routes::{
        index::get_index_route,
        sse::sse_feed,
        student_form::{internal_post_close_student_form, internal_post_student_form},
        students::{
            delete_student, internal_get_confirm_delete, internal_get_edit_student_form,
            internal_get_new_student_form, internal_get_students,
        },
    },
    state::RosterState,
};
use axum::{
    Router,
    routing::{delete, get, post},
};

pub mod index;
pub mod sse;
pub mod student_form;
pub mod students;

pub fn router(state: RosterState) -> Router {
    Router::new()
        .route("/", get(get_index_route))
        .route("/students", delete(delete_student))
        .route("/internal/students", get(internal_get_students))
        .route(
            "/internal/students/new_form",
            get(internal_get_new_student_form),
        )
        .route(
            "/internal/students/edit_form",
            get(internal_get_edit_student_form),
        )
        .route(
            "/internal/students/confirm_delete",
            get(internal_get_confirm_delete),
        )
        .route("/internal/students/form", post(internal_post_student_form))
        .route(
            "/internal/students/form/close",
            post(internal_post_close_student_form),
        )
        .route("/sse_feed", get(sse_feed))
        .with_state(state)
}
