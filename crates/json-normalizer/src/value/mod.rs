//! JSON document model with ordered objects.
mod map;
mod number;

use std::fmt;

pub(crate) use map::compare_keys;
pub use map::Map;
pub use number::Number;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A JSON value whose objects remember the order of their keys.
///
/// Equality is structural and order-sensitive for objects, because key order is exactly what
/// normalization changes. Use [`JsonValue::equivalent`] to compare while ignoring key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<JsonValue>),
    Object(Map),
}

impl JsonValue {
    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        if let JsonValue::Object(map) = self {
            Some(map)
        } else {
            None
        }
    }
    #[must_use]
    pub fn as_array(&self) -> Option<&[JsonValue]> {
        if let JsonValue::Array(items) = self {
            Some(items)
        } else {
            None
        }
    }
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        if let JsonValue::String(value) = self {
            Some(value)
        } else {
            None
        }
    }
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, JsonValue::Object(_))
    }
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, JsonValue::Array(_))
    }
    /// Name of the JSON type, as used in log output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            JsonValue::Null => "null",
            JsonValue::Bool(_) => "boolean",
            JsonValue::Number(_) => "number",
            JsonValue::String(_) => "string",
            JsonValue::Array(_) => "array",
            JsonValue::Object(_) => "object",
        }
    }
    /// Structural equality that ignores the order of object keys.
    #[must_use]
    pub fn equivalent(&self, other: &JsonValue) -> bool {
        match (self, other) {
            (JsonValue::Array(left), JsonValue::Array(right)) => {
                left.len() == right.len()
                    && left
                        .iter()
                        .zip(right.iter())
                        .all(|(left, right)| left.equivalent(right))
            }
            (JsonValue::Object(left), JsonValue::Object(right)) => left.equivalent(right),
            _ => self == other,
        }
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(value) => JsonValue::Bool(value),
            Value::Number(number) => JsonValue::Number(number.into()),
            Value::String(value) => JsonValue::String(value),
            Value::Array(items) => JsonValue::Array(items.into_iter().map(JsonValue::from).collect()),
            Value::Object(object) => JsonValue::Object(
                object
                    .into_iter()
                    .map(|(key, value)| (key, JsonValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&JsonValue> for Value {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(value) => Value::Bool(*value),
            JsonValue::Number(number) => Value::Number(number.as_serde().clone()),
            JsonValue::String(value) => Value::String(value.clone()),
            JsonValue::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            JsonValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.to_string(), Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(value) => Value::Bool(value),
            JsonValue::Number(number) => Value::Number(number.into()),
            JsonValue::String(value) => Value::String(value),
            JsonValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for JsonValue {
    fn from(value: bool) -> Self {
        JsonValue::Bool(value)
    }
}

impl From<u64> for JsonValue {
    fn from(value: u64) -> Self {
        JsonValue::Number(value.into())
    }
}

impl From<i64> for JsonValue {
    fn from(value: i64) -> Self {
        JsonValue::Number(value.into())
    }
}

impl From<&str> for JsonValue {
    fn from(value: &str) -> Self {
        JsonValue::String(value.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(value: String) -> Self {
        JsonValue::String(value)
    }
}

impl From<Map> for JsonValue {
    fn from(value: Map) -> Self {
        JsonValue::Object(value)
    }
}

fn eq(lhs: &Value, rhs: &JsonValue) -> bool {
    match (lhs, rhs) {
        (Value::Null, JsonValue::Null) => true,
        (Value::Bool(l), JsonValue::Bool(r)) => l == r,
        (Value::Number(l), JsonValue::Number(r)) => l == r.as_serde(),
        (Value::String(l), JsonValue::String(r)) => l == r,
        (Value::Array(l), JsonValue::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r.iter()).all(|(l, r)| eq(l, r))
        }
        (Value::Object(l), JsonValue::Object(r)) => {
            // Both sides iterate in insertion order, so this comparison is order-sensitive
            l.len() == r.len()
                && l.iter()
                    .zip(r.iter())
                    .all(|((lk, lv), (rk, rv))| lk == rk && eq(lv, rv))
        }
        _ => false,
    }
}

impl PartialEq<Value> for JsonValue {
    fn eq(&self, other: &Value) -> bool {
        eq(other, self)
    }
}

impl PartialEq<JsonValue> for Value {
    fn eq(&self, other: &JsonValue) -> bool {
        eq(self, other)
    }
}

impl Serialize for JsonValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeSeq};

        match self {
            JsonValue::Null => serializer.serialize_unit(),
            JsonValue::Bool(value) => serializer.serialize_bool(*value),
            JsonValue::Number(number) => number.as_serde().serialize(serializer),
            JsonValue::String(value) => serializer.serialize_str(value),
            JsonValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            JsonValue::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (key, value) in object.iter() {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for JsonValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // `serde_json` is built with `preserve_order`, so the intermediate value keeps key order
        Value::deserialize(deserializer).map(JsonValue::from)
    }
}

impl fmt::Display for JsonValue {
    /// Compact JSON encoding.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Value::from(self), f)
    }
}
