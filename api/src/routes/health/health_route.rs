//! GET /health — provider health snapshot.

use std::sync::Arc;

use axum::{Json, extract::State};
use llm_service::HealthStatus;

use crate::core::app_state::AppState;

/// Handler: GET /health
///
/// Probes each distinct provider profile (generation, embedding) and reports
/// endpoint, model, latency, and any failure message. Never errors.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Vec<HealthStatus>> {
    Json(state.profiles.health_all().await)
}
