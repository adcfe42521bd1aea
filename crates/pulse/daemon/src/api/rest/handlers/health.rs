//! Daemon liveness

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::rest::state::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub uptime: String,
    pub monitors: usize,
    /// Monitors whose sampling pipeline is degraded
    pub degraded_monitors: Vec<String>,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let degraded_monitors: Vec<String> = state
        .monitors
        .iter()
        .filter(|(_, handles)| handles.status.get_status().is_monitoring_degraded())
        .map(|(name, _)| name.clone())
        .collect();

    let status = if degraded_monitors.is_empty() { "healthy" } else { "degraded" };

    Json(HealthCheckResponse {
        status: status.to_string(),
        version: state.version.clone(),
        uptime: state.uptime(),
        monitors: state.monitors.len(),
        degraded_monitors,
    })
}
