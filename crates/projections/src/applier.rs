//! Applies item events to the item collection.

use async_trait::async_trait;
use domain::{DomainEvent, ItemEvent};
use event_store::EventEnvelope;
use item_store::{Document, ItemStore};
use serde::Serialize;

use crate::error::{ProjectionError, Result};
use crate::projection::{Applied, Projection};

/// The item projection.
///
/// Dispatches on the event's action tag: creation inserts, `ItemUpdated`
/// patches every item matching its filter, `ItemDeleted` removes every item
/// matching its filter. Unknown tags are logged and ignored.
#[derive(Clone)]
pub struct DomainApplier<S> {
    store: S,
}

impl<S: ItemStore> DomainApplier<S> {
    /// Creates an applier writing to `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying item store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applies one event.
    #[tracing::instrument(skip(self, event), fields(action = %event.action, event_id = %event.uuid))]
    pub async fn apply(&self, event: &EventEnvelope) -> Result<Applied> {
        let Some(item_event) = ItemEvent::from_envelope(event)? else {
            tracing::info!(action = %event.action, "event contains unregistered action");
            metrics::counter!("events_ignored_total").increment(1);
            return Ok(Applied::Ignored);
        };

        let applied = match &item_event {
            ItemEvent::Registered(item) => {
                self.store.insert_one(to_document(item)?).await?;
                Applied::Inserted
            }
            ItemEvent::Updated(payload) => {
                let filter = to_filter(&payload.filter, "ItemUpdated")?;
                let matched = self
                    .store
                    .update_many(&filter, &to_document(&payload.update)?)
                    .await?;
                Applied::Updated { matched }
            }
            ItemEvent::Deleted(payload) => {
                let filter = to_filter(&payload.filter, "ItemDeleted")?;
                let count = self.store.delete_many(&filter).await?;
                Applied::Deleted { count }
            }
        };

        metrics::counter!("events_applied_total", "action" => item_event.event_type())
            .increment(1);
        Ok(applied)
    }
}

fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(ProjectionError::MalformedPayload(other.to_string())),
    }
}

fn to_filter<T: Serialize>(value: &T, action: &'static str) -> Result<Document> {
    let filter = to_document(value)?;
    if filter.is_empty() {
        return Err(ProjectionError::EmptyFilter(action));
    }
    Ok(filter)
}

#[async_trait]
impl<S: ItemStore> Projection for DomainApplier<S> {
    fn name(&self) -> &'static str {
        "ItemCollection"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<Applied> {
        self.apply(event).await
    }

    async fn reset(&self) -> Result<()> {
        let removed = self.store.delete_many(&Document::new()).await?;
        tracing::info!(removed, "item collection cleared");
        Ok(())
    }
}
