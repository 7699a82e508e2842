//! Core projection trait and position tracking.

use async_trait::async_trait;
use event_store::EventEnvelope;

use crate::Result;

/// Tracks how many events a projection has processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionPosition {
    /// Number of events processed by this projection.
    pub events_processed: u64,
}

impl ProjectionPosition {
    /// Creates a new position at zero.
    pub fn zero() -> Self {
        Self {
            events_processed: 0,
        }
    }

    /// Advances the position by one event.
    pub fn advance(&self) -> Self {
        Self {
            events_processed: self.events_processed + 1,
        }
    }
}

impl std::fmt::Display for ProjectionPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "position({})", self.events_processed)
    }
}

/// What applying one event did to the materialized state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A new record was stored.
    Inserted,

    /// Every record matching the filter was patched.
    Updated { matched: u64 },

    /// Every record matching the filter was removed.
    Deleted { count: u64 },

    /// The action is not one this projection knows; nothing changed.
    Ignored,
}

/// A projection that applies events to materialized state.
#[async_trait]
pub trait Projection: Send + Sync {
    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Applies a single event.
    ///
    /// Unknown actions are not errors; they return [`Applied::Ignored`].
    async fn handle(&self, event: &EventEnvelope) -> Result<Applied>;

    /// Resets the projection to its initial state.
    async fn reset(&self) -> Result<()>;
}
