// HTTP boundary: JSON endpoint wrapping the aggregation engine.
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tracing::error;

use crate::aggregator::Aggregator;
use crate::freshness::FreshnessTracker;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub freshness: Arc<FreshnessTracker>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/prices", get(get_prices))
        .route("/status", get(status))
        .with_state(state)
}

async fn status() -> &'static str {
    "ok"
}

/// Runs one aggregation pass per request. The aggregator itself never fails,
/// so the 500 branch only fires if the pass dies outright; that is the one
/// user-visible failure mode.
async fn get_prices(State(state): State<AppState>) -> impl IntoResponse {
    let aggregator = Arc::clone(&state.aggregator);
    match tokio::spawn(async move { aggregator.aggregate().await }).await {
        Ok(offers) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "count": offers.len(),
                "data": offers,
                "lastUpdated": state.freshness.time_since(),
            })),
        ),
        Err(e) => {
            error!("aggregation task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": "price aggregation failed",
                })),
            )
        }
    }
}
