//! Item identifier resolution.

use common::ItemId;

use super::Item;
use crate::error::Result;

/// Resolves the item's identifier in place.
///
/// A supplied identifier must parse as a UUID and is rewritten in canonical
/// form. An empty or nil identifier is replaced by a freshly generated one.
pub fn assign_identifier(item: &mut Item) -> Result<ItemId> {
    let id = if item.item_id.is_empty() {
        None
    } else {
        Some(ItemId::parse(&item.item_id)?)
    };

    let id = match id {
        Some(id) if !id.is_nil() => id,
        _ => ItemId::new(),
    };

    item.item_id = id.to_string();
    Ok(id)
}
