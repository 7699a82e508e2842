use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An inbound request to change the state of an aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandEnvelope {
    /// The requested action (e.g., "AddItem").
    pub action: String,

    /// Action-specific JSON payload.
    #[serde(default)]
    pub data: serde_json::Value,

    /// Groups a request with its response.
    #[serde(default)]
    pub correlation_id: Uuid,

    /// The command's own identity.
    pub uuid: Uuid,

    /// Where the response document should be sent.
    #[serde(default)]
    pub response_topic: String,

    /// Name of the service that issued the command.
    #[serde(default)]
    pub source: String,

    /// Topic the command was read from.
    #[serde(default)]
    pub source_topic: String,

    /// Time-to-live in seconds, counted from `timestamp`. Zero disables expiry.
    #[serde(default)]
    pub ttl_sec: i64,

    /// Issue time in seconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
}

impl CommandEnvelope {
    /// Creates a command issued now with fresh identifiers and no TTL.
    pub fn new(action: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            action: action.into(),
            data,
            correlation_id: Uuid::new_v4(),
            uuid: Uuid::new_v4(),
            response_topic: String::new(),
            source: String::new(),
            source_topic: String::new(),
            ttl_sec: 0,
            timestamp: Utc::now().timestamp(),
        }
    }

    /// Sets the response topic.
    pub fn with_response_topic(mut self, topic: impl Into<String>) -> Self {
        self.response_topic = topic.into();
        self
    }

    /// Sets the time-to-live.
    pub fn with_ttl(mut self, ttl_sec: i64) -> Self {
        self.ttl_sec = ttl_sec;
        self
    }

    /// Returns true if the command outlived its TTL at `now` (Unix seconds).
    ///
    /// A deadline past the range of `i64` never expires.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.ttl_sec > 0
            && self
                .timestamp
                .checked_add(self.ttl_sec)
                .is_some_and(|deadline| deadline < now)
    }

    /// Returns true if the command has outlived its TTL.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}
