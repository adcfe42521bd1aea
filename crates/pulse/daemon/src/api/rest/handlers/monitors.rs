//! Monitor status and event handlers

use axum::{
    extract::{Path, State},
    Json,
};
use pulse_types::{IssueTransition, StatusSnapshot};

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};

/// List the latest status of every monitor
pub async fn list_monitors(State(state): State<AppState>) -> Json<Vec<StatusSnapshot>> {
    Json(
        state
            .monitors
            .values()
            .map(|handles| handles.status.get_status())
            .collect(),
    )
}

/// Get the latest status of one monitor
pub async fn get_monitor_status(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<StatusSnapshot>> {
    let handles = state
        .monitor(&name)
        .ok_or_else(|| ApiError::NotFound(format!("Monitor {} not found", name)))?;

    Ok(Json(handles.status.get_status()))
}

/// Peek at queued issue transitions without draining them
pub async fn get_monitor_events(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<IssueTransition>>> {
    let handles = state
        .monitor(&name)
        .ok_or_else(|| ApiError::NotFound(format!("Monitor {} not found", name)))?;

    Ok(Json(handles.events.snapshot()))
}
