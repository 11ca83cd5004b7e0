//! Health check handler.

use axum::Json;
use serde_json::{json, Value};

/// Liveness check. Does not touch the database.
///
/// # Returns
/// - 200 OK with `{ "status": "healthy", "version": ... }`
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
