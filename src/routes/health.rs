//! GET /health

use axum::Json;
use axum::extract::State;
use std::sync::Arc;

use crate::types::HealthResponse;

/// Health check. Returns OK, the auth base path and how many auth routes
/// are mounted.
pub async fn health(State(state): State<Arc<crate::AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        base_path: state.config.base_path.to_string(),
        routes: state.route_count,
    })
}
