//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub events: usize,
    pub replay_position: u64,
}

/// GET /health: reports liveness, the event log size and how far replay has got.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        events: state.events.event_count().await,
        replay_position: state.state_builder.position().await.events_processed,
    })
}
