//! Dispatch endpoint handler.

use crate::api::AppState;
use crate::envelope::{DispatchRequest, DispatchResponse};
use axum::{extract::State, Json};
use std::sync::Arc;

/// POST /v1/dispatch - Route and invoke one request.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DispatchRequest>,
) -> Json<DispatchResponse> {
    Json(state.dispatcher.handle(request).await)
}
