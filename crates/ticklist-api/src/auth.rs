//! Session authentication.
//!
//! The session token comes from the session cookie or from an
//! `Authorization: Bearer` header; the header wins when both are present.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use axum_extra::extract::cookie::CookieJar;

use crate::error::ApiError;
use crate::AppState;

/// Extractor for the authenticated owner. Rejects with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

/// Pull the session token out of request headers.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(cookie_name)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
    })
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, &state.session_cookie_name)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        match state.sessions.validate(&token).await? {
            Some(user_id) => Ok(AuthUser { user_id }),
            None => {
                tracing::debug!("Rejected unknown or expired session");
                Err(ApiError::Unauthorized("Invalid or expired session".to_string()))
            }
        }
    }
}
