//! Domain event trait.

use serde::Serialize;

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + Send + Sync + Clone {
    /// Returns the action tag written on the event envelope.
    fn event_type(&self) -> &'static str;
}
