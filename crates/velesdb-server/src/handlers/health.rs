//! Health check handler.

use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use crate::types::HealthResponse;
use crate::AppState;

/// Reports whether every open collection and the data directory are reachable.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let report = state.db.health();
    Json(HealthResponse {
        status: if report.healthy { "healthy" } else { "degraded" },
        collection_count: report.collection_count,
        version: env!("CARGO_PKG_VERSION"),
        detail: report.detail,
    })
}
