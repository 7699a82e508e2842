//! Item service: routes commands to their handlers.

use event_store::{CommandEnvelope, EventEnvelope, ResponseDocument};
use item_store::ItemStore;

use super::handlers::{add_item, delete_item, update_item};
use crate::command::{CommandAction, CommandContext, CommandOutcome};
use crate::error::{CommandError, ErrorKind, Result};

/// A handled command: the response for the caller and, on success, the event to publish.
#[derive(Debug, Clone)]
pub struct CommandReply {
    pub response: ResponseDocument,
    pub event: Option<EventEnvelope>,
}

/// Service for handling shipment item commands.
pub struct ItemService<S> {
    ctx: CommandContext<S>,
}

impl<S: ItemStore> ItemService<S> {
    /// Creates a new item service over the given context.
    pub fn new(ctx: CommandContext<S>) -> Self {
        Self { ctx }
    }

    /// Returns the handler context.
    pub fn context(&self) -> &CommandContext<S> {
        &self.ctx
    }

    /// Handles one command, producing at most one event.
    #[tracing::instrument(skip(self, command), fields(action = %command.action, command_id = %command.uuid))]
    pub async fn handle(&self, command: &CommandEnvelope) -> Result<CommandOutcome> {
        let action: CommandAction = match command.action.parse() {
            Ok(action) => action,
            Err(e) => {
                let outcome: Result<CommandOutcome> = Err(e);
                record("unknown", &outcome);
                return outcome;
            }
        };

        let outcome = if command.is_expired() {
            Err(CommandError::Expired)
        } else {
            match action {
                CommandAction::AddItem => add_item(&self.ctx, command).await,
                CommandAction::DeleteItem => delete_item(&self.ctx, command).await,
                CommandAction::UpdateItem => update_item(&self.ctx, command).await,
            }
        };

        record(action.as_str(), &outcome);
        outcome
    }

    /// Handles one command and wraps the result in a response document.
    pub async fn process(&self, command: &CommandEnvelope) -> CommandReply {
        match self.handle(command).await {
            Ok(CommandOutcome { result, event }) => CommandReply {
                response: ResponseDocument::success(command, result),
                event: Some(event),
            },
            Err(e) => CommandReply {
                response: ResponseDocument::failure(command, e.to_string(), e.kind().code()),
                event: None,
            },
        }
    }
}

fn record<T>(action: &'static str, outcome: &Result<T>) {
    let label = match outcome {
        Ok(_) => "ok",
        Err(e) => {
            match e.kind() {
                ErrorKind::User => tracing::info!(error = %e, "command rejected"),
                ErrorKind::Internal => tracing::error!(error = %e, "command failed"),
            }
            e.kind().as_str()
        }
    };

    metrics::counter!("commands_handled_total", "action" => action, "outcome" => label)
        .increment(1);
}
