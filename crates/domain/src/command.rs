//! Command handling infrastructure.

use std::str::FromStr;

use common::AggregateId;
use event_store::{CommandEnvelope, EventEnvelope};
use item_store::ItemStore;

use crate::error::{CommandError, Result};
use crate::event::DomainEvent;

/// The closed set of commands this aggregate accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandAction {
    AddItem,
    DeleteItem,
    UpdateItem,
}

impl CommandAction {
    /// All accepted actions.
    pub const ALL: [CommandAction; 3] = [
        CommandAction::AddItem,
        CommandAction::DeleteItem,
        CommandAction::UpdateItem,
    ];

    /// The wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            CommandAction::AddItem => "AddItem",
            CommandAction::DeleteItem => "DeleteItem",
            CommandAction::UpdateItem => "UpdateItem",
        }
    }
}

impl FromStr for CommandAction {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| CommandError::UnknownAction(s.to_string()))
    }
}

impl std::fmt::Display for CommandAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business rules for `UpdateItem` that can be switched per deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdatePolicy {
    /// Reject updates that change an item's lot.
    pub lock_lot: bool,
}

/// Everything a handler needs, passed explicitly on every call.
#[derive(Debug, Clone)]
pub struct CommandContext<S> {
    /// Collection holding the materialized items.
    pub store: S,

    /// Written as the `source` of every emitted event.
    pub service_name: String,

    pub policy: UpdatePolicy,
}

impl<S: ItemStore> CommandContext<S> {
    /// Creates a context with the default update policy.
    pub fn new(store: S, service_name: impl Into<String>) -> Self {
        Self {
            store,
            service_name: service_name.into(),
            policy: UpdatePolicy::default(),
        }
    }

    /// Replaces the update policy.
    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Wraps a domain event for publication.
    ///
    /// The event's correlation id is the originating command's uuid.
    pub fn build_event<E: DomainEvent>(
        &self,
        command: &CommandEnvelope,
        event: &E,
    ) -> Result<EventEnvelope> {
        let envelope = EventEnvelope::builder()
            .action(event.event_type())
            .aggregate_id(AggregateId::SHIPMENT)
            .correlation_id(command.uuid)
            .data(event)?
            .source(self.service_name.clone())
            .build()?;
        Ok(envelope)
    }
}

/// What a successful command produces.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// Returned to the caller in the response document.
    pub result: serde_json::Value,

    /// To be published; applying it makes the change durable.
    pub event: EventEnvelope,
}
