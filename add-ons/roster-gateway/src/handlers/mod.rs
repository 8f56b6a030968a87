//! Route handlers and the mapping from manager errors to HTTP responses.

pub mod students;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use roster_core::RosterError;

/// Error returned by every handler. Rendered as `{"error": kind, "detail": message}`.
#[derive(Debug)]
pub enum ApiError {
    Roster(RosterError),
    BadRequest(String),
}

impl From<RosterError> for ApiError {
    fn from(e: RosterError) -> Self {
        Self::Roster(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Roster(RosterError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Roster(RosterError::AlreadyExists(_))
            | Self::Roster(RosterError::Validation(_))
            | Self::Roster(RosterError::QueryParse(_)) => StatusCode::BAD_REQUEST,
            Self::Roster(RosterError::Persistence(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Roster(e) => e.kind(),
            Self::BadRequest(_) => "bad_request",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            Self::Roster(e) => e.to_string(),
            Self::BadRequest(msg) => msg.clone(),
        };
        if status.is_server_error() {
            tracing::error!(
                target: "roster::gateway",
                kind = self.kind(),
                detail = %detail,
                "request failed"
            );
        } else {
            tracing::debug!(
                target: "roster::gateway",
                kind = self.kind(),
                detail = %detail,
                "request rejected"
            );
        }
        (
            status,
            Json(serde_json::json!({ "error": self.kind(), "detail": detail })),
        )
            .into_response()
    }
}
