//! Envelopes and event log plumbing for the shipment aggregate.
//!
//! Commands arrive as [`CommandEnvelope`]s, handlers emit [`EventEnvelope`]s
//! through an [`EventPublisher`], and replies go back as [`ResponseDocument`]s.
//! An [`EventSource`] replays the event history for one aggregate.

pub mod command;
pub mod error;
pub mod event;
pub mod memory;
pub mod response;
pub mod source;

pub use command::CommandEnvelope;
pub use common::AggregateId;
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId};
pub use memory::InMemoryEventLog;
pub use response::ResponseDocument;
pub use source::{EventPublisher, EventSource, EventStream, ReplayRequest};
