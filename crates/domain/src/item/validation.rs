//! Creation-time checks.

use item_store::ItemStore;

use super::Item;
use crate::error::{CommandError, Result};

/// Checks that every field required at creation is set.
///
/// Fields are checked in a fixed order and the first missing one is reported.
pub fn check_required_fields(item: &Item) -> Result<()> {
    let checks: [(&'static str, bool); 10] = [
        ("DateArrived", item.date_arrived == 0),
        ("Lot", item.lot.is_empty()),
        ("Name", item.name.is_empty()),
        ("Origin", item.origin.is_empty()),
        ("Price", item.price == 0.0),
        ("RSCustomerID", item.rs_customer_id.is_empty()),
        ("SKU", item.sku.is_empty()),
        ("Timestamp", item.timestamp == 0),
        ("TotalWeight", item.weight == 0.0),
        ("UPC", item.upc.is_empty()),
    ];

    match checks.iter().find(|(_, missing)| *missing) {
        Some((field, _)) => Err(CommandError::MissingField(field)),
        None => Ok(()),
    }
}

/// Validates an item about to be created.
///
/// Runs the field checks, then looks the identifier up in the store. This
/// lookup is not atomic with the later insert; the store's unique index is
/// the backstop against concurrent creations.
pub async fn validate_new_item<S>(store: &S, item: &Item) -> Result<()>
where
    S: ItemStore + ?Sized,
{
    check_required_fields(item)?;

    let filter = Item::with_id(item.item_id.clone()).to_document()?;
    if store.find_one(&filter).await?.is_some() {
        return Err(CommandError::Conflict);
    }

    Ok(())
}
