//! Shipment item aggregate: record, patches, events and command handlers.

mod events;
mod handlers;
mod identifier;
mod model;
mod patch;
mod service;
mod validation;

pub use events::{DeletePayload, EventAction, ItemEvent, UpdatePayload};
pub use handlers::{UpdateParams, add_item, check_immutable_fields, delete_item, update_item};
pub use identifier::assign_identifier;
pub use model::Item;
pub use patch::ItemPatch;
pub use service::{CommandReply, ItemService};
pub use validation::{check_required_fields, validate_new_item};
