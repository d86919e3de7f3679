//! Shared helpers for working with loosely-structured JSON.
//!
//! Completion backends return JSON of wildly varying shape; the sanitizer
//! leans on these helpers to pull usable strings out of whatever arrived.

use serde_json::Value;

/// Coerce a JSON value into a plain string.
///
/// Ladder, in order:
/// - string: passthrough
/// - array: coerce each element and join with a space
/// - object with a string "text" field: unwrap it
/// - other object: compact JSON stringification
/// - number / bool: stringified
/// - null: None
pub fn coerce_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(coerce_to_string).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(" "))
            }
        }
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                Some(text.clone())
            } else {
                serde_json::to_string(value).ok()
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
    }
}

/// Find the first of `keys` present in `record` and coerce its value to a
/// string. Empty or whitespace-only results count as absent.
pub fn coalesce_field(record: &Value, keys: &[&str]) -> Option<String> {
    let map = record.as_object()?;
    for key in keys {
        if let Some(value) = map.get(*key)
            && let Some(text) = coerce_to_string(value)
        {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}
