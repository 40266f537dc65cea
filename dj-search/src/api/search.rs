//! Search endpoint

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::aggregator::AggregateResult;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

/// GET /search?q=QUERY
///
/// Runs the multi-source aggregation. An empty result set across every
/// source is a valid 200 ("no matches"), not an error.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<AggregateResult>> {
    let query = params.q.as_deref().map(str::trim).unwrap_or("");
    if query.is_empty() {
        return Err(ApiError::BadRequest("Missing ?q= parameter".to_string()));
    }

    tracing::info!(query = %query, "search request");

    Ok(Json(state.aggregator.search(query).await))
}

/// Build search routes
pub fn search_routes() -> Router<AppState> {
    Router::new().route("/search", get(search))
}
