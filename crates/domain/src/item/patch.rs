//! Partial item updates.

use serde::{Deserialize, Serialize};

use super::Item;

/// A partial item: each field is either present or absent.
///
/// Present fields overwrite, absent ones leave the target untouched. A field
/// that is present but empty is still present, so `{"lot": ""}` clears the lot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(rename = "itemID", default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,

    #[serde(rename = "dateArrived", default, skip_serializing_if = "Option::is_none")]
    pub date_arrived: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(rename = "rsCustomerID", default, skip_serializing_if = "Option::is_none")]
    pub rs_customer_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    #[serde(rename = "totalWeight", default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upc: Option<String>,
}

fn text(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn number<T: Default + PartialEq + Copy>(value: T) -> Option<T> {
    (value != T::default()).then_some(value)
}

fn overlay<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
    if source.is_some() {
        target.clone_from(source);
    }
}

impl From<&Item> for ItemPatch {
    /// Every non-empty field of the item becomes present.
    fn from(item: &Item) -> Self {
        Self {
            item_id: text(&item.item_id),
            date_arrived: number(item.date_arrived),
            lot: text(&item.lot),
            name: text(&item.name),
            origin: text(&item.origin),
            price: number(item.price),
            rs_customer_id: text(&item.rs_customer_id),
            sku: text(&item.sku),
            timestamp: number(item.timestamp),
            weight: number(item.weight),
            upc: text(&item.upc),
        }
    }
}

impl ItemPatch {
    /// Returns true if no field is present.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Lays every present field of `update` over `self`.
    pub fn merge(mut self, update: &ItemPatch) -> Self {
        overlay(&mut self.item_id, &update.item_id);
        overlay(&mut self.date_arrived, &update.date_arrived);
        overlay(&mut self.lot, &update.lot);
        overlay(&mut self.name, &update.name);
        overlay(&mut self.origin, &update.origin);
        overlay(&mut self.price, &update.price);
        overlay(&mut self.rs_customer_id, &update.rs_customer_id);
        overlay(&mut self.sku, &update.sku);
        overlay(&mut self.timestamp, &update.timestamp);
        overlay(&mut self.weight, &update.weight);
        overlay(&mut self.upc, &update.upc);
        self
    }

    /// Merges `update` onto a stored item, returning the full merged field set.
    pub fn merged_onto(item: &Item, update: &ItemPatch) -> Self {
        ItemPatch::from(item).merge(update)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn stored() -> Item {
        Item {
            item_id: "i-1".into(),
            date_arrived: 1000,
            lot: "L1".into(),
            name: "N".into(),
            origin: "O".into(),
            price: 12.3,
            rs_customer_id: "C1".into(),
            sku: "S1".into(),
            timestamp: 1000,
            weight: 4.7,
            upc: "U1".into(),
        }
    }

    #[test]
    fn from_item_marks_only_set_fields_present() {
        let patch = ItemPatch::from(&Item {
            lot: "L1".into(),
            price: 2.0,
            ..Item::default()
        });

        assert_eq!(patch.lot.as_deref(), Some("L1"));
        assert_eq!(patch.price, Some(2.0));
        assert!(patch.name.is_none());
        assert!(patch.timestamp.is_none());
    }

    #[test]
    fn merge_overwrites_present_keys_only() {
        let update: ItemPatch = serde_json::from_value(json!({"lot": "L2"})).unwrap();
        let merged = ItemPatch::merged_onto(&stored(), &update);

        assert_eq!(merged.lot.as_deref(), Some("L2"));
        assert_eq!(merged.item_id.as_deref(), Some("i-1"));
        assert_eq!(merged.name.as_deref(), Some("N"));
        assert_eq!(merged.price, Some(12.3));
        assert_eq!(merged.weight, Some(4.7));
        assert_eq!(merged.upc.as_deref(), Some("U1"));
    }

    #[test]
    fn explicit_empty_value_is_kept() {
        let update: ItemPatch = serde_json::from_value(json!({"origin": ""})).unwrap();
        let merged = ItemPatch::merged_onto(&stored(), &update);

        assert_eq!(merged.origin.as_deref(), Some(""));
        assert_eq!(serde_json::to_value(&merged).unwrap()["origin"], "");
    }

    #[test]
    fn serializes_only_present_fields() {
        let patch = ItemPatch {
            sku: Some("S9".into()),
            weight: Some(1.5),
            ..ItemPatch::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"sku": "S9", "totalWeight": 1.5})
        );
        assert!(ItemPatch::default().is_empty());
    }
}
