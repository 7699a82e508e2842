//! Command side of the shipment item aggregate.
//!
//! This crate turns commands into events:
//! - `Item` and `ItemPatch`, the record and its partial form
//! - Identifier assignment and creation-time validation
//! - AddItem, DeleteItem and UpdateItem handlers
//! - `ItemService`, which routes a command envelope to its handler

pub mod command;
pub mod error;
pub mod event;
pub mod item;

pub use command::{CommandAction, CommandContext, CommandOutcome, UpdatePolicy};
pub use error::{CommandError, ErrorKind, Result};
pub use event::DomainEvent;
pub use item::{
    CommandReply, DeletePayload, EventAction, Item, ItemEvent, ItemPatch, ItemService,
    UpdatePayload,
};
