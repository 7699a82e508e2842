use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AggregateId, EventStoreError, Result};

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an event ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EventId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<EventId> for Uuid {
    fn from(id: EventId) -> Self {
        id.0
    }
}

/// An outbound fact produced by a command handler.
///
/// The `data` payload is action-specific JSON; the replay path decodes it
/// with the same types the write path encoded it with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    /// What happened (e.g., "ItemRegistered", "ItemUpdated").
    pub action: String,

    /// Tag of the aggregate type that produced the event.
    pub aggregate_id: AggregateId,

    /// Copied from the originating command's `uuid`.
    pub correlation_id: Uuid,

    /// The event payload as JSON.
    pub data: serde_json::Value,

    /// Unique identifier for this event.
    pub uuid: EventId,

    /// Creation time in nanoseconds since the Unix epoch.
    pub nano_time: i64,

    /// Name of the service that emitted the event.
    pub source: String,

    /// Coarse time partition (calendar year of creation).
    pub year_bucket: i16,
}

impl EventEnvelope {
    /// Creates a new event envelope builder.
    pub fn builder() -> EventEnvelopeBuilder {
        EventEnvelopeBuilder::default()
    }
}

/// Builder for constructing event envelopes.
#[derive(Debug, Default)]
pub struct EventEnvelopeBuilder {
    uuid: Option<EventId>,
    action: Option<String>,
    aggregate_id: Option<AggregateId>,
    correlation_id: Option<Uuid>,
    data: Option<serde_json::Value>,
    nano_time: Option<i64>,
    source: Option<String>,
    year_bucket: Option<i16>,
}

impl EventEnvelopeBuilder {
    /// Sets the event ID. If not set, a new ID will be generated.
    pub fn event_id(mut self, id: EventId) -> Self {
        self.uuid = Some(id);
        self
    }

    /// Sets the action tag.
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the aggregate tag.
    pub fn aggregate_id(mut self, id: AggregateId) -> Self {
        self.aggregate_id = Some(id);
        self
    }

    /// Sets the correlation ID.
    pub fn correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Sets the payload from a serializable value.
    pub fn data<T: Serialize>(mut self, data: &T) -> Result<Self> {
        self.data = Some(serde_json::to_value(data)?);
        Ok(self)
    }

    /// Sets the payload from a raw JSON value.
    pub fn data_raw(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets the creation time. If not set, the current time will be used.
    pub fn nano_time(mut self, nano_time: i64) -> Self {
        self.nano_time = Some(nano_time);
        self
    }

    /// Sets the emitting service name.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the year bucket. If not set, the current UTC year is used.
    pub fn year_bucket(mut self, year: i16) -> Self {
        self.year_bucket = Some(year);
        self
    }

    /// Builds the event envelope.
    ///
    /// Fails with `IncompleteEnvelope` if action, aggregate_id,
    /// correlation_id, data or source is missing.
    pub fn build(self) -> Result<EventEnvelope> {
        let now = Utc::now();
        Ok(EventEnvelope {
            action: self
                .action
                .ok_or(EventStoreError::IncompleteEnvelope("action"))?,
            aggregate_id: self
                .aggregate_id
                .ok_or(EventStoreError::IncompleteEnvelope("aggregate_id"))?,
            correlation_id: self
                .correlation_id
                .ok_or(EventStoreError::IncompleteEnvelope("correlation_id"))?,
            data: self.data.ok_or(EventStoreError::IncompleteEnvelope("data"))?,
            uuid: self.uuid.unwrap_or_default(),
            nano_time: self
                .nano_time
                .unwrap_or_else(|| now.timestamp_nanos_opt().unwrap_or_default()),
            source: self
                .source
                .ok_or(EventStoreError::IncompleteEnvelope("source"))?,
            year_bucket: self.year_bucket.unwrap_or(now.year() as i16),
        })
    }
}
