//! Provider listing endpoint handler.

use crate::api::{AppState, ProviderEntry, ProvidersResponse};
use axum::{extract::State, Json};
use std::sync::Arc;

/// GET /v1/providers - List registered providers sorted by id.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<ProvidersResponse> {
    let providers = state
        .registry()
        .descriptors()
        .into_iter()
        .map(|d| ProviderEntry {
            id: d.id.clone(),
            kind: d.kind,
        })
        .collect();

    Json(ProvidersResponse { providers })
}
