//! The distinguished "value not yet known" sentinel.
//!
//! During a preview the engine cannot compute every property of a resource
//! that has not been created yet. Such properties travel as the [`UNKNOWN`]
//! string, both on the wire and inside resolved [`Value`] payloads. Any
//! payload that contains it anywhere in its structure is itself unknown.

use serde_json::Value;

/// Reserved string standing in for a value that is not known during a preview.
pub const UNKNOWN: &str = "04da6b54-80e4-46f7-96ec-b56ff0331ba9";

/// Returns the unknown sentinel as a wire value.
#[must_use]
pub fn unknown() -> Value {
    Value::String(UNKNOWN.to_owned())
}

/// Returns `true` if `value` is exactly the unknown sentinel.
#[must_use]
pub fn is_unknown(value: &Value) -> bool {
    matches!(value, Value::String(s) if s == UNKNOWN)
}

/// Returns `true` if the sentinel appears anywhere within `value`.
///
/// Lists and maps are searched recursively; map keys are not inspected.
#[must_use]
pub fn contains_unknowns(value: &Value) -> bool {
    match value {
        Value::String(s) => s == UNKNOWN,
        Value::Array(items) => items.iter().any(contains_unknowns),
        Value::Object(map) => map.values().any(contains_unknowns),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}
