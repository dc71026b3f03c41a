//! HTTP route handlers.

pub mod accounts;
pub mod transfers;

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::api::HealthResponse;
use crate::state::AppState;

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let timestamp = state.engine.lock().unwrap().timestamp();
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp,
    })
}
