//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use event_store::EventStoreError;
use projections::ProjectionError;

/// API-level error type that maps to HTTP responses.
///
/// Command rejections are not API errors: they travel in the response
/// document. These cover failures around the command.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The item collection could not be brought up to date.
    #[error("state replay failed: {0}")]
    Replay(#[from] ProjectionError),

    /// The emitted event could not be published.
    #[error("event publish failed: {0}")]
    Publish(#[from] EventStoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Replay(ProjectionError::EventSource(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Replay(_) | ApiError::Publish(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = self.to_string();
        tracing::error!(error = %message, "request failed");

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
