//! Persistence for the materialized shipment items.
//!
//! Items are stored as JSON documents and selected with partial-document
//! filters: a document matches when it carries every key of the filter with
//! an equal value.

pub mod document;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use document::{Document, ITEM_ID_FIELD, TIMESTAMP_FIELD, matches};
pub use error::{ItemStoreError, Result};
pub use memory::InMemoryItemStore;
pub use postgres::PostgresItemStore;
pub use store::{ItemStore, ItemStoreExt};
