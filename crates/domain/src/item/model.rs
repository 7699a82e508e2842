//! The shipment item record.

use item_store::Document;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{CommandError, Result};

fn is_zero_i64(value: &i64) -> bool {
    *value == 0
}

fn is_zero_f64(value: &f64) -> bool {
    *value == 0.0
}

/// A shipment item as stored and as carried in event payloads.
///
/// The serialized form is sparse: empty strings and zero numbers are left
/// out, so "zero" and "unset" are the same thing. A partial `Item` doubles as
/// a filter that selects every stored record carrying its non-empty fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "itemID", default, skip_serializing_if = "String::is_empty")]
    pub item_id: String,

    #[serde(rename = "dateArrived", default, skip_serializing_if = "is_zero_i64")]
    pub date_arrived: i64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub lot: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub origin: String,

    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub price: f64,

    #[serde(rename = "rsCustomerID", default, skip_serializing_if = "String::is_empty")]
    pub rs_customer_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sku: String,

    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub timestamp: i64,

    #[serde(rename = "totalWeight", default, skip_serializing_if = "is_zero_f64")]
    pub weight: f64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub upc: String,
}

impl Item {
    /// A filter selecting the item with `item_id`.
    pub fn with_id(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            ..Self::default()
        }
    }

    /// Converts the sparse form into a store document.
    pub fn to_document(&self) -> Result<Document> {
        to_document(self, "item")
    }

    /// Reads a stored document back as an item.
    pub fn from_document(document: Document) -> Result<Self> {
        serde_json::from_value(serde_json::Value::Object(document))
            .map_err(|e| CommandError::UnexpectedShape(e.to_string()))
    }

    /// Returns true if no field is set, i.e. the item as a filter would match everything.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Serializes `value` into a store document.
pub(crate) fn to_document<T: Serialize>(value: &T, what: &'static str) -> Result<Document> {
    match serde_json::to_value(value).map_err(|source| CommandError::Encode { what, source })? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(CommandError::UnexpectedShape(format!(
            "{what} encoded as {other}, expected an object"
        ))),
    }
}

/// Decodes a command payload.
///
/// An absent (`null`) payload decodes to the empty value, so the handler
/// reports what is missing instead of a decode failure.
pub(crate) fn decode<T: DeserializeOwned + Default>(data: &serde_json::Value) -> Result<T> {
    if data.is_null() {
        return Ok(T::default());
    }
    T::deserialize(data).map_err(CommandError::Decode)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_with_wire_names_and_sparse_fields() {
        let item = Item {
            item_id: "i-1".into(),
            lot: "L1".into(),
            price: 12.3,
            rs_customer_id: "C1".into(),
            weight: 4.7,
            ..Item::default()
        };

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            json!({
                "itemID": "i-1",
                "lot": "L1",
                "price": 12.3,
                "rsCustomerID": "C1",
                "totalWeight": 4.7
            })
        );
    }

    #[test]
    fn missing_fields_decode_as_zero() {
        let item: Item = serde_json::from_value(json!({"lot": "L1"})).unwrap();
        assert_eq!(item.lot, "L1");
        assert_eq!(item.item_id, "");
        assert_eq!(item.price, 0.0);
        assert_eq!(item.timestamp, 0);
    }

    #[test]
    fn empty_item_is_an_empty_document() {
        assert!(Item::default().is_empty());
        assert!(Item::default().to_document().unwrap().is_empty());
        assert!(!Item::with_id("x").is_empty());
    }

    #[test]
    fn from_document_rejects_wrong_types() {
        let doc = json!({"lot": 5}).as_object().cloned().unwrap();
        let err = Item::from_document(doc).unwrap_err();
        assert!(matches!(err, CommandError::UnexpectedShape(_)));
    }
}
