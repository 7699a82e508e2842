use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a shipment item.
///
/// Items carry their identifier as a string on the wire; this wrapper is
/// what that string must parse into before it is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Creates a new random item ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an item ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses an item ID from its string form.
    pub fn parse(value: &str) -> Result<Self, ParseItemIdError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|e| ParseItemIdError {
                value: value.to_string(),
                reason: e.to_string(),
            })
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true for the all-zero UUID, which counts as "no identifier".
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = ParseItemIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for ItemId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<ItemId> for Uuid {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

/// Error returned when a string is not a valid item identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid item id '{value}': {reason}")]
pub struct ParseItemIdError {
    pub value: String,
    pub reason: String,
}

/// Numeric tag identifying an aggregate type on every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(i16);

impl AggregateId {
    /// The shipment aggregate.
    pub const SHIPMENT: AggregateId = AggregateId(2);

    pub const fn new(value: i16) -> Self {
        Self(value)
    }

    pub fn as_i16(&self) -> i16 {
        self.0
    }
}

impl std::fmt::Display for AggregateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
