//! dj-search library interface
//!
//! Exposes the aggregation engine, source adapters, and HTTP API for
//! integration testing.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod sources;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::aggregator::Aggregator;
use crate::sources::soulseek::SoulseekAdapter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Search orchestration hub
    pub aggregator: Arc<Aggregator>,
    /// Peer-network adapter handle, kept for the /health reachability
    /// probe; None when credentials are not configured
    pub slskd: Option<Arc<SoulseekAdapter>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(aggregator: Arc<Aggregator>, slskd: Option<Arc<SoulseekAdapter>>) -> Self {
        Self {
            aggregator,
            slskd,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// The dashboard consuming this API is served from another origin, so
/// CORS is permissive.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/", get(api::endpoint_index))
        .merge(api::search_routes())
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
