//! Shared identifier types used across the shipment item workspace.

mod types;

pub use types::{AggregateId, ItemId, ParseItemIdError};
