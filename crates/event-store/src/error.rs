use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when publishing or replaying events.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The upstream event stream could not be opened.
    #[error("Event stream unavailable: {0}")]
    StreamUnavailable(String),

    /// The upstream did not hand over a stream within the allowed time.
    #[error("Timed out after {0:?} waiting for the event stream")]
    Timeout(Duration),

    /// A single delivery on an open stream failed.
    #[error("Event delivery failed: {0}")]
    Delivery(String),

    /// An envelope was built without one of its required fields.
    #[error("Incomplete event envelope: missing {0}")]
    IncompleteEnvelope(&'static str),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;
