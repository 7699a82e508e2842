use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    EventEnvelope, EventStoreError, Result,
    source::{EventPublisher, EventSource, EventStream, ReplayRequest},
};

/// In-memory event log.
///
/// Records published events in publish order and replays them per
/// aggregate. Used by tests and by the service when no broker is wired in.
#[derive(Clone, Default)]
pub struct InMemoryEventLog {
    events: Arc<RwLock<Vec<EventEnvelope>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryEventLog {
    /// Creates a new empty event log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events recorded.
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    /// Returns a copy of every recorded event in publish order.
    pub async fn events(&self) -> Vec<EventEnvelope> {
        self.events.read().await.clone()
    }

    /// Clears all events.
    pub async fn clear(&self) {
        self.events.write().await.clear();
    }

    /// Makes subsequent replay requests fail to open.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventLog {
    async fn publish(&self, event: EventEnvelope) -> Result<()> {
        tracing::debug!(action = %event.action, event_id = %event.uuid, "event published");
        metrics::counter!("events_published_total").increment(1);
        self.events.write().await.push(event);
        Ok(())
    }
}

#[async_trait]
impl EventSource for InMemoryEventLog {
    async fn replay(&self, request: ReplayRequest) -> Result<EventStream> {
        use futures_util::stream;

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(EventStoreError::StreamUnavailable(format!(
                "replay {} rejected: event log unavailable",
                request.correlation_id
            )));
        }

        let store = self.events.read().await;
        let events: Vec<_> = store
            .iter()
            .filter(|e| e.aggregate_id == request.aggregate_id)
            .skip(request.after_position as usize)
            .cloned()
            .collect();

        let stream = stream::iter(events.into_iter().map(|e| Ok(Some(e))));
        Ok(Box::pin(stream))
    }
}
