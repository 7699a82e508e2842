use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CommandEnvelope;

/// The reply sent to a command's response topic.
///
/// Carries either the handler's canonical result in `data`, or an error
/// message with its numeric code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDocument {
    pub correlation_id: Uuid,

    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub error_code: i16,

    #[serde(default)]
    pub topic: String,

    pub uuid: Uuid,
}

fn is_zero(code: &i16) -> bool {
    *code == 0
}

impl ResponseDocument {
    /// Builds a successful response to `command`.
    pub fn success(command: &CommandEnvelope, data: serde_json::Value) -> Self {
        Self {
            correlation_id: command.correlation_id,
            data,
            error: String::new(),
            error_code: 0,
            topic: command.response_topic.clone(),
            uuid: command.uuid,
        }
    }

    /// Builds a failed response to `command`.
    pub fn failure(command: &CommandEnvelope, error: impl Into<String>, error_code: i16) -> Self {
        Self {
            correlation_id: command.correlation_id,
            data: serde_json::Value::Null,
            error: error.into(),
            error_code,
            topic: command.response_topic.clone(),
            uuid: command.uuid,
        }
    }

    /// Returns true if this response reports a failure.
    pub fn is_error(&self) -> bool {
        self.error_code != 0 || !self.error.is_empty()
    }
}
