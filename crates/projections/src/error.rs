//! Projection error types.

use thiserror::Error;

/// Errors that can occur during projection processing.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The event source failed, or the replay stream could not be established.
    #[error("Event source error: {0}")]
    EventSource(#[from] event_store::EventStoreError),

    /// Failed to deserialize an event payload.
    #[error("Event deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The item store rejected a write.
    #[error("Item store error: {0}")]
    Store(#[from] item_store::ItemStoreError),

    /// An update or delete event carried a filter that would select every item.
    #[error("Event {0} has an empty filter")]
    EmptyFilter(&'static str),

    /// A payload did not decode into a JSON object.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
