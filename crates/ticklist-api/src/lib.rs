//! ticklist-api - HTTP API for the ticklist todo service.
//!
//! The binary in `main.rs` wires configuration, logging and the database;
//! everything request-facing lives here so it can be driven in tests with
//! in-memory repositories.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{delete, get};
use axum::Router;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use ticklist_core::{SessionValidator, TagRepository, TodoRepository};
use ticklist_db::Database;

pub use auth::AuthUser;
pub use config::{ConfigError, RateLimitConfig, ServerConfig};
pub use error::ApiError;
pub use extract::{AppJson, AppPath};
pub use middleware::rate_limit::GlobalRateLimiter;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<dyn TodoRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub sessions: Arc<dyn SessionValidator>,
    /// Name of the cookie carrying the session token.
    pub session_cookie_name: String,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    /// State backed by PostgreSQL repositories.
    pub fn from_database(db: &Database, config: &ServerConfig) -> Self {
        Self {
            todos: Arc::new(db.todos.clone()),
            tags: Arc::new(db.tags.clone()),
            sessions: Arc::new(db.sessions.clone()),
            session_cookie_name: config.session_cookie_name.clone(),
            rate_limiter: config
                .rate_limit
                .as_ref()
                .map(|rl| Arc::new(middleware::rate_limit::build_limiter(rl))),
        }
    }
}

/// Build the application router with all middleware.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    use handlers::{health, tags, todos};

    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/todos",
            get(todos::list_todos).post(todos::create_todo),
        )
        .route(
            "/api/todos/:id",
            get(todos::get_todo)
                .patch(todos::update_todo)
                .delete(todos::delete_todo),
        )
        .route(
            "/api/todos/:id/tags",
            get(tags::list_todo_tags).post(tags::add_tags_to_todo),
        )
        .route(
            "/api/todos/:id/tags/:tag_id",
            delete(tags::remove_tag_from_todo),
        )
        .route("/api/tags", get(tags::list_tags).post(tags::create_tag))
        .route(
            "/api/tags/:id",
            get(tags::get_tag)
                .patch(tags::update_tag)
                .delete(tags::delete_tag),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(config.request_body_limit_bytes))
        .with_state(state)
}
