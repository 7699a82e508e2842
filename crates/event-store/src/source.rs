use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_core::Stream;
use uuid::Uuid;

use crate::{AggregateId, EventEnvelope, Result};

/// A replay stream.
///
/// Each delivery is either an event, an empty slot (`Ok(None)`), or a
/// delivery error. The stream ends when the replay is complete.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<Option<EventEnvelope>>> + Send>>;

/// Parameters for requesting a replay of an aggregate's events.
#[derive(Debug, Clone)]
pub struct ReplayRequest {
    /// Identifies this replay request to the upstream.
    pub correlation_id: Uuid,

    /// Only events tagged with this aggregate are delivered.
    pub aggregate_id: AggregateId,

    /// Number of events the caller has already applied; these are not re-sent.
    pub after_position: u64,

    /// How long the upstream may take to hand over the stream.
    pub timeout: Duration,
}

impl ReplayRequest {
    /// Creates a request for the full history of `aggregate_id`.
    pub fn new(correlation_id: Uuid, aggregate_id: AggregateId, timeout: Duration) -> Self {
        Self {
            correlation_id,
            aggregate_id,
            after_position: 0,
            timeout,
        }
    }

    /// Skips the first `position` events.
    pub fn after(mut self, position: u64) -> Self {
        self.after_position = position;
        self
    }
}

/// Source of replayable event history.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Opens an ordered stream of events for the requested aggregate.
    ///
    /// Returns an error only if the stream itself cannot be established;
    /// failures of individual deliveries travel inside the stream.
    async fn replay(&self, request: ReplayRequest) -> Result<EventStream>;
}

/// Sink for events emitted by command handlers.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes one event.
    async fn publish(&self, event: EventEnvelope) -> Result<()>;
}
