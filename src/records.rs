//! Generic record handling for backend entities
//!
//! Entities are flat or one-level-nested JSON objects fetched verbatim from
//! the backend. No normalization or caching happens on this side; a record
//! lives exactly as long as the screen that fetched it.

use serde_json::{Map, Value};

/// A single backend entity as fetched.
pub type Record = Map<String, Value>;

/// Server-assigned identifier. Immutable, opaque.
pub fn id(record: &Record) -> Option<&str> {
    record.get("_id").and_then(Value::as_str)
}

/// Text rendering of one field for a table cell.
///
/// Embedded references (`{_id, name}`) render as their name; arrays render
/// as a row count.
pub fn cell_text(record: &Record, key: &str) -> String {
    match record.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => if *b { "yes" } else { "no" }.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Object(map)) => map
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Some(Value::Array(items)) => format!("{} row(s)", items.len()),
    }
}

/// Reference id from either an embedded `{_id, name}` object or a bare id
/// string. References arrive embedded on read and are sent back as the id.
pub fn ref_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => map
            .get("_id")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Convert an ISO datetime string to the `yyyy-mm-dd` form date inputs use.
pub fn date_input(value: &Value) -> String {
    value
        .as_str()
        .map(|s| s.chars().take(10).collect())
        .unwrap_or_default()
}

/// Boolean field, defaulting to false when absent or mistyped.
pub fn flag(record: &Record, key: &str) -> bool {
    record.get(key).and_then(Value::as_bool).unwrap_or(false)
}
