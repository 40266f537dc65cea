//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status (e.g., "ok")
    pub status: String,
    /// Module name ("dj-search")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Whether the slskd daemon answered a reachability probe; absent
    /// when the peer-network source is not configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_network_online: Option<bool>,
}

/// GET /health
///
/// Health check endpoint for monitoring.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    let peer_network_online = match &state.slskd {
        Some(adapter) => Some(adapter.is_healthy().await),
        None => None,
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "dj-search".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        peer_network_online,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
