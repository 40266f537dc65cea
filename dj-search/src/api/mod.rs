//! HTTP API handlers for dj-search

pub mod health;
pub mod search;

pub use health::health_routes;
pub use search::search_routes;

use axum::Json;
use serde_json::{json, Value};

/// GET /
///
/// Endpoint index, mirroring what the dashboard expects when probing
/// the service.
pub async fn endpoint_index() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "endpoints": ["/search?q=QUERY", "/health"],
    }))
}
