//! Body and path extractors with structured rejections.
//!
//! axum's `Json` and `Path` reject with plain-text bodies. `AppJson` splits
//! failures into two cases the client can tell apart: the body is not JSON
//! at all (`Invalid JSON payload`), or it is JSON of the wrong shape
//! (`Invalid payload` with field details). `AppPath` reports unparseable
//! path segments, such as a malformed id, as `Invalid path parameter`.

use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;

use ticklist_core::FieldError;

use crate::error::ApiError;

/// JSON request body.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json_content_type(req.headers()) {
            return Err(ApiError::InvalidJson.into_response());
        }
        // Body-limit rejections keep their own status (413).
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        parse_json(&bytes)
            .map(AppJson)
            .map_err(IntoResponse::into_response)
    }
}

/// Path parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppPath<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| AppPath(value))
            .map_err(path_rejection)
    }
}

/// Missing route parameters are a routing bug and keep axum's 500.
fn path_rejection(rejection: PathRejection) -> Response {
    if rejection.status().is_server_error() {
        return rejection.into_response();
    }
    ApiError::InvalidPath(rejection.body_text()).into_response()
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Parse a JSON body into `T`.
pub fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|_| ApiError::InvalidJson)?;
    serde_json::from_value(value).map_err(|e| ApiError::InvalidPayload(vec![shape_error(&e)]))
}

/// Field error for a serde data error. serde names the field in backticks
/// for missing and unknown fields; other errors are reported against `body`.
fn shape_error(err: &serde_json::Error) -> FieldError {
    let message = err.to_string();
    let field = message
        .split_once("field `")
        .and_then(|(_, rest)| rest.split_once('`'))
        .map(|(field, _)| field.to_string())
        .unwrap_or_else(|| "body".to_string());
    FieldError::new(field, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use ticklist_core::CreateTodoRequest;

    #[test]
    fn test_content_type_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_json_content_type(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        assert!(is_json_content_type(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        assert!(is_json_content_type(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/merge-patch+json"),
        );
        assert!(is_json_content_type(&headers));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert!(!is_json_content_type(&headers));
    }

    #[test]
    fn test_syntax_error_is_invalid_json() {
        let err = parse_json::<CreateTodoRequest>(b"{\"title\":").unwrap_err();
        assert!(matches!(err, ApiError::InvalidJson));
    }

    #[test]
    fn test_missing_field_names_the_field() {
        let err = parse_json::<CreateTodoRequest>(b"{}").unwrap_err();
        match err {
            ApiError::InvalidPayload(details) => assert_eq!(details[0].field, "title"),
            other => panic!("Expected InvalidPayload, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_type_is_invalid_payload() {
        let err = parse_json::<CreateTodoRequest>(b"{\"title\":5}").unwrap_err();
        assert!(matches!(err, ApiError::InvalidPayload(_)));
    }

    #[test]
    fn test_valid_body() {
        let req: CreateTodoRequest = parse_json(b"{\"title\":\"Exercise\"}").unwrap();
        assert_eq!(req.title, "Exercise");
    }
}
