//! State replay endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use projections::ReplaySummary;
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct ReplayResponse {
    pub applied: u64,
    pub ignored: u64,
    pub failed: u64,
    pub skipped: u64,
    pub position: u64,
}

impl From<ReplaySummary> for ReplayResponse {
    fn from(summary: ReplaySummary) -> Self {
        Self {
            applied: summary.applied,
            ignored: summary.ignored,
            failed: summary.failed,
            skipped: summary.skipped,
            position: summary.position.events_processed,
        }
    }
}

/// POST /replay: apply events not yet applied.
#[tracing::instrument(skip(state))]
pub async fn catch_up(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReplayResponse>, ApiError> {
    let summary = state.state_builder.catch_up().await?;
    Ok(Json(summary.into()))
}

/// POST /replay/rebuild: clear the item collection and replay the full history.
#[tracing::instrument(skip(state))]
pub async fn rebuild(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReplayResponse>, ApiError> {
    let summary = state.state_builder.rebuild().await?;
    Ok(Json(summary.into()))
}
