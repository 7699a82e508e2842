//! AddItem, DeleteItem and UpdateItem handlers.
//!
//! Handlers only read from the store. The change itself becomes durable when
//! the returned event is applied by the projector.

use common::ItemId;
use event_store::CommandEnvelope;
use item_store::ItemStore;
use serde::Deserialize;
use serde_json::json;

use super::model::decode;
use super::{
    DeletePayload, Item, ItemEvent, ItemPatch, UpdatePayload, assign_identifier, validate_new_item,
};
use crate::command::{CommandContext, CommandOutcome, UpdatePolicy};
use crate::error::{CommandError, Result};

/// Parameters of an `UpdateItem` command.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateParams {
    #[serde(default)]
    pub filter: Option<Item>,

    #[serde(default)]
    pub update: Option<ItemPatch>,
}

/// Registers a new item.
///
/// Decodes the item, resolves its identifier, validates it, and emits
/// `ItemRegistered` carrying the canonical item.
#[tracing::instrument(skip(ctx, command), fields(command_id = %command.uuid))]
pub async fn add_item<S: ItemStore>(
    ctx: &CommandContext<S>,
    command: &CommandEnvelope,
) -> Result<CommandOutcome> {
    let mut item: Item = decode(&command.data)?;
    let item_id = assign_identifier(&mut item)?;
    validate_new_item(&ctx.store, &item).await?;

    let result = serde_json::to_value(&item).map_err(|source| CommandError::Encode {
        what: "item",
        source,
    })?;
    let event = ctx.build_event(command, &ItemEvent::Registered(item))?;

    tracing::debug!(%item_id, "item registered");
    Ok(CommandOutcome { result, event })
}

/// Deletes every item matching a partial-item filter.
///
/// Nothing is removed here; the emitted `ItemDeleted` carries the filter so
/// replay can select the same items again.
#[tracing::instrument(skip(ctx, command), fields(command_id = %command.uuid))]
pub async fn delete_item<S: ItemStore>(
    ctx: &CommandContext<S>,
    command: &CommandEnvelope,
) -> Result<CommandOutcome> {
    let filter: Item = decode(&command.data)?;
    if filter.is_empty() {
        return Err(CommandError::EmptyFilter);
    }

    let matches = ctx.store.find(&filter.to_document()?).await?;
    if matches.is_empty() {
        return Err(CommandError::NotFound);
    }

    let matched_count = matches.len() as u64;
    let event = ctx.build_event(
        command,
        &ItemEvent::Deleted(DeletePayload {
            filter,
            matched_count,
        }),
    )?;

    tracing::debug!(matched_count, "items matched for deletion");
    Ok(CommandOutcome {
        result: json!({ "matchedCount": matched_count }),
        event,
    })
}

/// Updates the item matching a filter.
///
/// The newest matching item is merged with the update; the result and the
/// `ItemUpdated` payload carry the filter and the full merged field set.
#[tracing::instrument(skip(ctx, command), fields(command_id = %command.uuid))]
pub async fn update_item<S: ItemStore>(
    ctx: &CommandContext<S>,
    command: &CommandEnvelope,
) -> Result<CommandOutcome> {
    let params: UpdateParams = decode(&command.data)?;
    let filter = params
        .filter
        .ok_or(CommandError::MissingUpdateParams("filter"))?;
    let mut update = params
        .update
        .ok_or(CommandError::MissingUpdateParams("update"))?;
    if filter.is_empty() {
        return Err(CommandError::EmptyFilter);
    }

    let matched = ctx
        .store
        .find_one(&filter.to_document()?)
        .await?
        .ok_or(CommandError::NotFound)?;
    let matched = Item::from_document(matched)?;

    check_immutable_fields(&matched, &update, ctx.policy)?;
    // Any identifier left in the update names the matched item; keep its stored form
    update.item_id = None;

    let payload = UpdatePayload {
        filter,
        update: ItemPatch::merged_onto(&matched, &update),
    };
    let result = serde_json::to_value(&payload).map_err(|source| CommandError::Encode {
        what: "update result",
        source,
    })?;
    let event = ctx.build_event(command, &ItemEvent::Updated(payload))?;

    tracing::debug!(item_id = %matched.item_id, "item update accepted");
    Ok(CommandOutcome { result, event })
}

/// Rejects updates that would change a field fixed after creation.
///
/// The identifier is always fixed; the lot only under `lock_lot`. Repeating
/// the current value is not a change, and identifiers compare in canonical form.
pub fn check_immutable_fields(
    matched: &Item,
    update: &ItemPatch,
    policy: UpdatePolicy,
) -> Result<()> {
    if update
        .item_id
        .as_ref()
        .is_some_and(|id| !same_identifier(id, &matched.item_id))
    {
        return Err(CommandError::ImmutableField("itemID"));
    }

    if policy.lock_lot && update.lot.as_ref().is_some_and(|lot| *lot != matched.lot) {
        return Err(CommandError::ImmutableField("lot"));
    }

    Ok(())
}

fn same_identifier(a: &str, b: &str) -> bool {
    a == b
        || matches!(
            (ItemId::parse(a), ItemId::parse(b)),
            (Ok(a), Ok(b)) if a == b
        )
}

#[cfg(test)]
mod tests {
    use event_store::CommandEnvelope;
    use item_store::{InMemoryItemStore, ItemStore};
    use serde_json::{Value, json};

    use super::*;
    use crate::error::ErrorKind;

    const ITEM_ID: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";

    fn full_item_json(item_id: &str) -> Value {
        json!({
            "itemID": item_id,
            "lot": "L1",
            "name": "N",
            "origin": "O",
            "price": 12.3,
            "rsCustomerID": "C1",
            "sku": "S1",
            "upc": "U1",
            "dateArrived": 1000,
            "timestamp": 1000,
            "totalWeight": 4.7
        })
    }

    async fn context_with_stored_item() -> CommandContext<InMemoryItemStore> {
        let store = InMemoryItemStore::new();
        store
            .insert_one(full_item_json(ITEM_ID).as_object().cloned().unwrap())
            .await
            .unwrap();
        CommandContext::new(store, "test-svc")
    }

    #[tokio::test]
    async fn add_item_generates_identifier() {
        let ctx = CommandContext::new(InMemoryItemStore::new(), "test-svc");
        let cmd = CommandEnvelope::new("AddItem", full_item_json(""));

        let outcome = add_item(&ctx, &cmd).await.unwrap();

        let item_id = outcome.result["itemID"].as_str().unwrap();
        assert!(!item_id.is_empty());
        assert_eq!(outcome.event.action, "ItemRegistered");
        assert_eq!(outcome.event.correlation_id, cmd.uuid);
        assert_eq!(outcome.event.data, outcome.result);
    }

    #[tokio::test]
    async fn add_item_does_not_write_to_store() {
        let store = InMemoryItemStore::new();
        let ctx = CommandContext::new(store.clone(), "test-svc");
        let cmd = CommandEnvelope::new("AddItem", full_item_json(""));

        add_item(&ctx, &cmd).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn add_item_rejects_existing_identifier() {
        let ctx = context_with_stored_item().await;
        let cmd = CommandEnvelope::new("AddItem", full_item_json(ITEM_ID));

        let err = add_item(&ctx, &cmd).await.unwrap_err();
        assert!(matches!(err, CommandError::Conflict));
    }

    #[tokio::test]
    async fn add_item_with_undecodable_data_is_internal() {
        let ctx = CommandContext::new(InMemoryItemStore::new(), "test-svc");
        let cmd = CommandEnvelope::new("AddItem", json!({"price": "twelve"}));

        let err = add_item(&ctx, &cmd).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn add_item_with_null_data_reports_first_missing_field() {
        let ctx = CommandContext::new(InMemoryItemStore::new(), "test-svc");
        let cmd = CommandEnvelope::new("AddItem", Value::Null);

        let err = add_item(&ctx, &cmd).await.unwrap_err();
        assert!(matches!(err, CommandError::MissingField("DateArrived")));
        assert!(err.is_user_error());
    }

    #[tokio::test]
    async fn delete_item_reports_matched_count() {
        let ctx = context_with_stored_item().await;
        ctx.store
            .insert_one(
                json!({"itemID": "other", "lot": "L1"})
                    .as_object()
                    .cloned()
                    .unwrap(),
            )
            .await
            .unwrap();
        let cmd = CommandEnvelope::new("DeleteItem", json!({"lot": "L1"}));

        let outcome = delete_item(&ctx, &cmd).await.unwrap();

        assert_eq!(outcome.result, json!({"matchedCount": 2}));
        assert_eq!(outcome.event.action, "ItemDeleted");
        assert_eq!(outcome.event.data, json!({"lot": "L1", "matchedCount": 2}));
        assert_eq!(ctx.store.len().await, 2);
    }

    #[tokio::test]
    async fn delete_item_without_match_is_not_found() {
        let ctx = context_with_stored_item().await;
        let cmd = CommandEnvelope::new("DeleteItem", json!({"lot": "L9"}));

        let err = delete_item(&ctx, &cmd).await.unwrap_err();
        assert!(matches!(err, CommandError::NotFound));
        assert!(err.is_user_error());
    }

    #[tokio::test]
    async fn delete_item_rejects_empty_filter() {
        let ctx = context_with_stored_item().await;
        let cmd = CommandEnvelope::new("DeleteItem", json!({}));

        let err = delete_item(&ctx, &cmd).await.unwrap_err();
        assert!(matches!(err, CommandError::EmptyFilter));
    }

    #[tokio::test]
    async fn delete_item_with_null_data_is_empty_filter() {
        let ctx = context_with_stored_item().await;
        let cmd = CommandEnvelope::new("DeleteItem", Value::Null);

        let err = delete_item(&ctx, &cmd).await.unwrap_err();
        assert!(matches!(err, CommandError::EmptyFilter));
        assert!(err.is_user_error());
        assert_eq!(ctx.store.len().await, 1);
    }

    #[tokio::test]
    async fn update_item_merges_onto_matched_item() {
        let ctx = context_with_stored_item().await;
        let cmd = CommandEnvelope::new(
            "UpdateItem",
            json!({"filter": {"lot": "L1"}, "update": {"lot": "L2"}}),
        );

        let outcome = update_item(&ctx, &cmd).await.unwrap();

        let mut expected_update = full_item_json(ITEM_ID);
        expected_update["lot"] = json!("L2");
        assert_eq!(
            outcome.event.data,
            json!({"filter": {"lot": "L1"}, "update": expected_update})
        );
        assert_eq!(outcome.result, outcome.event.data);
        assert_eq!(outcome.event.action, "ItemUpdated");
    }

    #[tokio::test]
    async fn update_item_requires_filter_and_update() {
        let ctx = context_with_stored_item().await;

        for data in [
            json!({"update": {"lot": "L2"}}),
            json!({"filter": {"lot": "L1"}}),
            json!({"filter": null, "update": {"lot": "L2"}}),
            json!({}),
            Value::Null,
        ] {
            let cmd = CommandEnvelope::new("UpdateItem", data);
            let err = update_item(&ctx, &cmd).await.unwrap_err();
            assert!(matches!(err, CommandError::MissingUpdateParams(_)));
            assert!(err.is_user_error());
        }
    }

    #[tokio::test]
    async fn update_item_without_match_is_not_found() {
        let ctx = context_with_stored_item().await;
        let cmd = CommandEnvelope::new(
            "UpdateItem",
            json!({"filter": {"lot": "L9"}, "update": {"name": "X"}}),
        );

        let err = update_item(&ctx, &cmd).await.unwrap_err();
        assert!(matches!(err, CommandError::NotFound));
    }

    #[tokio::test]
    async fn update_item_rejects_identifier_change() {
        let ctx = context_with_stored_item().await;
        let cmd = CommandEnvelope::new(
            "UpdateItem",
            json!({"filter": {"lot": "L1"}, "update": {"itemID": "changed"}}),
        );

        let err = update_item(&ctx, &cmd).await.unwrap_err();
        assert!(matches!(err, CommandError::ImmutableField("itemID")));
    }

    #[tokio::test]
    async fn update_item_accepts_own_identifier_in_any_case() {
        let ctx = context_with_stored_item().await;
        let cmd = CommandEnvelope::new(
            "UpdateItem",
            json!({
                "filter": {"lot": "L1"},
                "update": {"itemID": ITEM_ID.to_uppercase(), "name": "X"}
            }),
        );

        let outcome = update_item(&ctx, &cmd).await.unwrap();
        assert_eq!(outcome.event.data["update"]["itemID"], ITEM_ID);
        assert_eq!(outcome.event.data["update"]["name"], "X");
    }

    #[tokio::test]
    async fn lot_change_allowed_unless_locked() {
        let data = json!({"filter": {"lot": "L1"}, "update": {"lot": "L2"}});

        let ctx = context_with_stored_item().await;
        let cmd = CommandEnvelope::new("UpdateItem", data.clone());
        assert!(update_item(&ctx, &cmd).await.is_ok());

        let locked = context_with_stored_item()
            .await
            .with_policy(UpdatePolicy { lock_lot: true });
        let err = update_item(&locked, &cmd).await.unwrap_err();
        assert!(matches!(err, CommandError::ImmutableField("lot")));

        let same_lot = CommandEnvelope::new(
            "UpdateItem",
            json!({"filter": {"lot": "L1"}, "update": {"lot": "L1", "name": "X"}}),
        );
        assert!(update_item(&locked, &same_lot).await.is_ok());
    }

    #[tokio::test]
    async fn update_item_with_malformed_record_is_internal() {
        let store = InMemoryItemStore::new();
        store
            .insert_one(json!({"itemID": "x", "lot": "L1", "price": "free"}).as_object().cloned().unwrap())
            .await
            .unwrap();
        let ctx = CommandContext::new(store, "test-svc");
        let cmd = CommandEnvelope::new(
            "UpdateItem",
            json!({"filter": {"lot": "L1"}, "update": {"name": "X"}}),
        );

        let err = update_item(&ctx, &cmd).await.unwrap_err();
        assert!(matches!(err, CommandError::UnexpectedShape(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
