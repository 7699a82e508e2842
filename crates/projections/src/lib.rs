//! Projection side of the shipment item aggregate.
//!
//! This crate rebuilds the item collection from the event history:
//! - [`Projection`] trait for applying one event to materialized state
//! - [`DomainApplier`], the item projection: insert, merge-update, delete-by-filter
//! - [`StateBuilder`], a best-effort replay loop that keeps going past bad events

pub mod applier;
pub mod builder;
pub mod error;
pub mod projection;

pub use applier::DomainApplier;
pub use builder::{ReplaySummary, StateBuilder};
pub use error::{ProjectionError, Result};
pub use projection::{Applied, Projection, ProjectionPosition};
