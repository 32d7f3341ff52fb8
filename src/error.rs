use crate::data::student::{ApiErrorBody, StudentId};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::html;
use snafu::Snafu;
use std::num::ParseIntError;

pub type RosterResult<T> = Result<T, RosterError>;

/// Shown whenever a failure carries no structured body to read a message out of.
pub const GENERIC_FAILURE_MESSAGE: &str = "Unable to reach the student service";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse request timeout {:?}", original))]
    ParseTimeout {
        source: ParseIntError,
        original: String,
    },
    #[snafu(display("Unable to build HTTP client"))]
    BuildClient { source: reqwest::Error },
    #[snafu(display("Error sending request to the student service"))]
    Transport { source: reqwest::Error },
    #[snafu(display("Error decoding response from the student service"))]
    DecodeResponse { source: reqwest::Error },
    #[snafu(display("Student service rejected the request ({}): {}", status, body.summary()))]
    Rejected { status: StatusCode, body: ApiErrorBody },
    #[snafu(display("Student service rejected the request ({}) without a readable body", status))]
    MalformedRejection { status: StatusCode },
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: StudentId },
    #[snafu(display("Request did not say which page it came from"))]
    MissingPage,
    #[snafu(display("Unable to parse page ID {:?}", raw))]
    InvalidPage { source: uuid::Error, raw: String },
}

impl RosterError {
    /// Toast text for list and delete failures: the server's top-level message only.
    pub fn notification_summary(&self) -> String {
        match self {
            Self::Rejected { body, .. } if !body.message.is_empty() => body.summary().to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Toast text for form submissions, which also lists field-level violations.
    pub fn notification_detail(&self) -> String {
        match self {
            Self::Rejected { body, .. } if !body.is_blank() => body.detailed(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for RosterError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BG: StatusCode = StatusCode::BAD_GATEWAY; //upstream broke
        const BR: StatusCode = StatusCode::BAD_REQUEST; //bad request

        let basic_error = |desc| {
            html! {
                div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
                    strong class="font-bold" {"Roster Error"}
                    span {(desc)}
                }
            }
        };

        let status_code = match &self {
            Self::BadEnvVar { .. } | Self::ParseTimeout { .. } => ISE,
            Self::BuildClient { .. } => ISE,
            Self::Transport { .. } | Self::DecodeResponse { .. } => BG,
            Self::Rejected { status, .. } | Self::MalformedRejection { status } => *status,
            Self::MissingStudent { .. } => NF,
            Self::MissingPage | Self::InvalidPage { .. } => BR,
        };

        error!(?self, "Error!");
        (status_code, Html(basic_error(self.to_string()))).into_response()
    }
}
