//! API error type and its HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use ticklist_core::FieldError;

/// Error returned by handlers and extractors.
#[derive(Debug)]
pub enum ApiError {
    /// Body was not parseable JSON.
    InvalidJson,
    /// Body parsed but failed shape or field validation.
    InvalidPayload(Vec<FieldError>),
    /// A path segment did not parse, e.g. an id that is not a UUID.
    InvalidPath(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    /// Anything the caller cannot act on; logged, never echoed.
    Internal(ticklist_core::Error),
}

impl From<ticklist_core::Error> for ApiError {
    fn from(err: ticklist_core::Error) -> Self {
        use ticklist_core::Error;
        match err {
            Error::Validation(details) => ApiError::InvalidPayload(details),
            Error::TodoNotFound(_) => ApiError::NotFound("Todo not found".to_string()),
            Error::TagNotFound(_) => ApiError::NotFound("Tag not found".to_string()),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            err if err.is_unique_violation() => {
                ApiError::Conflict("Resource already exists".to_string())
            }
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InvalidJson => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid JSON payload" }),
            ),
            ApiError::InvalidPayload(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid payload", "details": details }),
            ),
            ApiError::InvalidPath(msg) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Invalid path parameter",
                    "details": [FieldError::new("path", msg)],
                }),
            ),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
