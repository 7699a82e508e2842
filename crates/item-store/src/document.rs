use serde_json::Value;

/// A stored record, or a partial record used as a filter or patch.
pub type Document = serde_json::Map<String, Value>;

/// Key that must be unique across the collection.
pub const ITEM_ID_FIELD: &str = "itemID";

/// Key that orders query results (newest first).
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Returns true if `document` carries every key of `filter` with an equal value.
///
/// Numbers compare by value, so `12` matches `12.0`. An empty filter matches
/// everything.
pub fn matches(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, expected)| {
        document
            .get(key)
            .is_some_and(|actual| values_equal(actual, expected))
    })
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Extracts the ordering key of a document; documents without one sort last.
pub(crate) fn timestamp_of(document: &Document) -> Option<i64> {
    document.get(TIMESTAMP_FIELD).and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_f64().map(|f| f as i64))
    })
}

/// Extracts the unique key of a document as text.
pub(crate) fn unique_key_of(document: &Document) -> Option<String> {
    document.get(ITEM_ID_FIELD).map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
