//! Helpers over JSON value trees returned by the data service (pure, no IO).

use serde_json::Value;

use crate::error::SeriesError;

/// Fields probed, in order, when reducing an object sample to a single scalar.
pub const SCALAR_FIELDS: [&str; 4] = ["bpm", "score", "value", "average"];

/// Resolve a dot-notation path such as `sleep.contributors.efficiency`.
///
/// Object keys are matched exactly; numeric segments index into arrays.
/// An empty path resolves to the value itself.
pub fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Parse a stringified JSON value. Non-string values are returned unchanged.
pub fn try_parse_json(value: &Value) -> Result<Value, SeriesError> {
    match value {
        Value::String(raw) => serde_json::from_str(raw)
            .map_err(|e| SeriesError::MalformedValue(format!("{}: {}", truncate(raw, 40), e))),
        other => Ok(other.clone()),
    }
}

/// Like [`try_parse_json`], but keeps the original string when it is not JSON.
pub fn parse_if_stringified(value: &Value) -> Value {
    try_parse_json(value).unwrap_or_else(|_| value.clone())
}

/// Reduce a sample to a number, if it has one.
///
/// Numbers map to themselves, numeric strings are parsed, and objects yield
/// the first non-null of [`SCALAR_FIELDS`]. Anything else is absent.
pub fn scalar_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        Value::Object(map) => SCALAR_FIELDS
            .iter()
            .filter_map(|field| map.get(*field))
            .find(|v| !v.is_null())
            .and_then(scalar_of),
        _ => None,
    }
}

/// Items of a nested intraday value: the array itself or its `items` array.
pub fn nested_items(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get("items").and_then(Value::as_array),
        _ => None,
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
