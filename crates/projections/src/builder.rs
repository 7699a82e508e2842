//! Replay-driven state builder.

use std::time::Duration;

use common::AggregateId;
use event_store::{EventSource, EventStoreError, ReplayRequest};
use futures_util::StreamExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::Result;
use crate::projection::{Applied, Projection, ProjectionPosition};

/// Counts of what one replay did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Events that changed state.
    pub applied: u64,

    /// Events with an action the projection does not know.
    pub ignored: u64,

    /// Events the projection failed to apply, plus delivery errors.
    pub failed: u64,

    /// Empty deliveries.
    pub skipped: u64,

    /// Position after the replay.
    pub position: ProjectionPosition,
}

/// Rebuilds materialized state by replaying an aggregate's events.
///
/// Replay is sequential and best-effort: a delivery error or a failing event
/// is logged, counted, and passed over. The only error returned is failure
/// to establish the stream within the timeout.
///
/// The builder remembers how many events it has consumed and asks the source
/// only for later ones, so repeated catch-ups never apply an event twice.
/// Replays are serialized.
pub struct StateBuilder<E, P> {
    source: E,
    projection: P,
    aggregate_id: AggregateId,
    timeout: Duration,
    position: Mutex<ProjectionPosition>,
}

impl<E: EventSource, P: Projection> StateBuilder<E, P> {
    /// Creates a builder for the shipment aggregate.
    pub fn new(source: E, projection: P, timeout: Duration) -> Self {
        Self {
            source,
            projection,
            aggregate_id: AggregateId::SHIPMENT,
            timeout,
            position: Mutex::new(ProjectionPosition::zero()),
        }
    }

    /// Returns the projection being fed.
    pub fn projection(&self) -> &P {
        &self.projection
    }

    /// Returns how many events have been consumed so far.
    pub async fn position(&self) -> ProjectionPosition {
        *self.position.lock().await
    }

    /// Applies every event not yet consumed, under a fresh correlation id.
    pub async fn catch_up(&self) -> Result<ReplaySummary> {
        self.build_state(Uuid::new_v4(), self.timeout).await
    }

    /// Clears the projection and replays the whole history.
    #[tracing::instrument(skip(self), fields(projection = self.projection.name()))]
    pub async fn rebuild(&self) -> Result<ReplaySummary> {
        let mut position = self.position.lock().await;
        self.projection.reset().await?;
        *position = ProjectionPosition::zero();
        self.replay(&mut position, Uuid::new_v4(), self.timeout)
            .await
    }

    /// Requests the event stream for `correlation_id` and applies each event in order.
    ///
    /// `timeout` bounds how long the source may take to hand over the stream,
    /// not how long the replay runs.
    #[tracing::instrument(skip(self), fields(projection = self.projection.name()))]
    pub async fn build_state(
        &self,
        correlation_id: Uuid,
        timeout: Duration,
    ) -> Result<ReplaySummary> {
        let mut position = self.position.lock().await;
        self.replay(&mut position, correlation_id, timeout).await
    }

    async fn replay(
        &self,
        position: &mut ProjectionPosition,
        correlation_id: Uuid,
        timeout: Duration,
    ) -> Result<ReplaySummary> {
        let request = ReplayRequest::new(correlation_id, self.aggregate_id, timeout)
            .after(position.events_processed);

        let mut stream = tokio::time::timeout(timeout, self.source.replay(request))
            .await
            .map_err(|_| EventStoreError::Timeout(timeout))??;

        let mut summary = ReplaySummary::default();

        while let Some(delivery) = stream.next().await {
            let event = match delivery {
                Ok(Some(event)) => event,
                Ok(None) => {
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(error = %e, %correlation_id, "error in replay delivery");
                    metrics::counter!("replay_failures_total", "stage" => "delivery")
                        .increment(1);
                    summary.failed += 1;
                    continue;
                }
            };

            match self.projection.handle(&event).await {
                Ok(Applied::Ignored) => summary.ignored += 1,
                Ok(_) => summary.applied += 1,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        action = %event.action,
                        event_id = %event.uuid,
                        "failed to apply event"
                    );
                    metrics::counter!("replay_failures_total", "stage" => "apply").increment(1);
                    summary.failed += 1;
                }
            }

            *position = position.advance();
        }

        summary.position = *position;
        tracing::info!(
            applied = summary.applied,
            ignored = summary.ignored,
            failed = summary.failed,
            skipped = summary.skipped,
            position = %summary.position,
            "replay complete"
        );

        Ok(summary)
    }
}
