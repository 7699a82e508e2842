//! Item domain events.

use event_store::EventEnvelope;
use serde::{Deserialize, Serialize};

use super::{Item, ItemPatch};
use crate::event::DomainEvent;

/// The closed set of item event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventAction {
    Registered,
    Updated,
    Deleted,
}

impl EventAction {
    /// Action tags read as "item created". The first one is what handlers emit.
    pub const CREATION_ALIASES: [&'static str; 2] = ["ItemRegistered", "ItemAdded"];

    /// The tag written on emitted events.
    pub fn as_str(self) -> &'static str {
        match self {
            EventAction::Registered => Self::CREATION_ALIASES[0],
            EventAction::Updated => "ItemUpdated",
            EventAction::Deleted => "ItemDeleted",
        }
    }

    /// Maps an action tag to its kind, or `None` if this binary does not know it.
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            a if Self::CREATION_ALIASES.iter().any(|alias| *alias == a) => {
                Some(EventAction::Registered)
            }
            "ItemUpdated" => Some(EventAction::Updated),
            "ItemDeleted" => Some(EventAction::Deleted),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of ItemUpdated: the filter and the merged field set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePayload {
    pub filter: Item,
    pub update: ItemPatch,
}

/// Payload of ItemDeleted: the delete filter plus how many items it matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletePayload {
    #[serde(flatten)]
    pub filter: Item,

    #[serde(rename = "matchedCount", default)]
    pub matched_count: u64,
}

/// Events that can occur on the shipment item aggregate.
///
/// Serializes as the bare payload; the kind travels in the envelope's action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemEvent {
    /// A new item was accepted.
    Registered(Item),

    /// Items matching the filter take the merged field set.
    Updated(UpdatePayload),

    /// Items matching the filter were removed.
    Deleted(DeletePayload),
}

impl DomainEvent for ItemEvent {
    fn event_type(&self) -> &'static str {
        self.action().as_str()
    }
}

impl ItemEvent {
    /// The kind of this event.
    pub fn action(&self) -> EventAction {
        match self {
            ItemEvent::Registered(_) => EventAction::Registered,
            ItemEvent::Updated(_) => EventAction::Updated,
            ItemEvent::Deleted(_) => EventAction::Deleted,
        }
    }

    /// Decodes an envelope's payload according to its action tag.
    ///
    /// Returns `Ok(None)` for action tags this binary does not know.
    pub fn from_envelope(envelope: &EventEnvelope) -> Result<Option<Self>, serde_json::Error> {
        let Some(action) = EventAction::parse(&envelope.action) else {
            return Ok(None);
        };

        let data = &envelope.data;
        let event = match action {
            EventAction::Registered => ItemEvent::Registered(Item::deserialize(data)?),
            EventAction::Updated => ItemEvent::Updated(UpdatePayload::deserialize(data)?),
            EventAction::Deleted => ItemEvent::Deleted(DeletePayload::deserialize(data)?),
        };
        Ok(Some(event))
    }
}
