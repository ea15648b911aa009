//! Shell Error Types
//!
//! Errors of the local storefront server and their conversion to HTTP
//! responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::events::EventError;

/// Shell server errors
#[derive(Error, Debug)]
pub enum ShellError {
    /// The posted event could not be turned into an action
    #[error("Invalid event: {0}")]
    Event(#[from] EventError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ShellError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ShellError::Event(EventError::UnknownAction(_)) => {
                (StatusCode::BAD_REQUEST, "UNKNOWN_ACTION")
            }
            ShellError::Event(_) => (StatusCode::BAD_REQUEST, "INVALID_EVENT"),
            ShellError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ShellError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Shell error occurred"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Rejected request"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for shell handlers
pub type ShellResult<T> = Result<T, ShellError>;
