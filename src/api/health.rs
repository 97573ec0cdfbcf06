//! Health check endpoint handler.

use crate::api::{AppState, HealthResponse};
use axum::{extract::State, Json};
use std::sync::Arc;

/// GET /health - Return liveness and table sizes.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        providers: state.registry().len(),
        rules: state.dispatcher.routing().rules().len(),
    })
}
