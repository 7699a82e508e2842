//! Command intake endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::{CommandReply, ErrorKind};
use event_store::{CommandEnvelope, EventEnvelope, EventPublisher, ResponseDocument};

use crate::AppState;
use crate::error::ApiError;

/// POST /commands: handle one command envelope.
///
/// Catches the item collection up with the event log, handles the command,
/// publishes the resulting event, and returns the response document. A
/// rejected command still gets a response document, with a 4xx or 5xx status
/// matching its error kind.
#[tracing::instrument(skip(state, command), fields(action = %command.action, command_id = %command.uuid))]
pub async fn handle(
    State(state): State<Arc<AppState>>,
    Json(command): Json<CommandEnvelope>,
) -> Result<(StatusCode, Json<ResponseDocument>), ApiError> {
    state.state_builder.catch_up().await?;

    let CommandReply { response, event } = state.service.process(&command).await;

    let status = match ErrorKind::from_code(response.error_code) {
        None => StatusCode::OK,
        Some(ErrorKind::User) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(ErrorKind::Internal) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if let Some(event) = event {
        state.events.publish(event).await?;
    }

    Ok((status, Json(response)))
}

/// GET /events: every published event in publish order.
pub async fn events(State(state): State<Arc<AppState>>) -> Json<Vec<EventEnvelope>> {
    Json(state.events.events().await)
}
