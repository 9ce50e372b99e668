//! Store-native document values.
//!
//! Records leave the repositories as [`Document`]s: ordered maps whose values
//! may still carry store-only types (row identities, timestamps). The
//! serialization adapter in `application::serializer` is the only place that
//! turns them into transport-safe JSON.

use std::collections::BTreeMap;

use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

/// Key under which every stored row exposes its internal identity.
pub const ID_FIELD: &str = "_id";

pub type Document = BTreeMap<String, StoreValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    ObjectId(Uuid),
    Timestamp(OffsetDateTime),
    Array(Vec<StoreValue>),
    Document(Document),
}

/// Build a document from `(key, value)` pairs.
pub fn document<const N: usize>(fields: [(&str, StoreValue); N]) -> Document {
    fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

impl From<bool> for StoreValue {
    fn from(value: bool) -> Self {
        StoreValue::Bool(value)
    }
}

impl From<i64> for StoreValue {
    fn from(value: i64) -> Self {
        StoreValue::Int(value)
    }
}

impl From<f64> for StoreValue {
    fn from(value: f64) -> Self {
        StoreValue::Float(value)
    }
}

impl From<&str> for StoreValue {
    fn from(value: &str) -> Self {
        StoreValue::String(value.to_string())
    }
}

impl From<String> for StoreValue {
    fn from(value: String) -> Self {
        StoreValue::String(value)
    }
}

impl From<&String> for StoreValue {
    fn from(value: &String) -> Self {
        StoreValue::String(value.clone())
    }
}

impl From<Uuid> for StoreValue {
    fn from(value: Uuid) -> Self {
        StoreValue::ObjectId(value)
    }
}

impl From<OffsetDateTime> for StoreValue {
    fn from(value: OffsetDateTime) -> Self {
        StoreValue::Timestamp(value)
    }
}

impl From<Document> for StoreValue {
    fn from(value: Document) -> Self {
        StoreValue::Document(value)
    }
}

impl<T: Into<StoreValue>> From<Option<T>> for StoreValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(StoreValue::Null, Into::into)
    }
}

impl<T: Into<StoreValue>> From<Vec<T>> for StoreValue {
    fn from(value: Vec<T>) -> Self {
        StoreValue::Array(value.into_iter().map(Into::into).collect())
    }
}

impl From<&Option<String>> for StoreValue {
    fn from(value: &Option<String>) -> Self {
        value.as_deref().map_or(StoreValue::Null, StoreValue::from)
    }
}

/// Lift a transport value back into the store model. Strings stay strings, so
/// a serialized document never turns back into identities or timestamps.
impl From<Value> for StoreValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => StoreValue::Null,
            Value::Bool(flag) => StoreValue::Bool(flag),
            Value::Number(number) => match number.as_i64() {
                Some(int) => StoreValue::Int(int),
                None => StoreValue::Float(number.as_f64().unwrap_or_default()),
            },
            Value::String(text) => StoreValue::String(text),
            Value::Array(items) => {
                StoreValue::Array(items.into_iter().map(StoreValue::from).collect())
            }
            Value::Object(map) => StoreValue::Document(
                map.into_iter()
                    .map(|(key, value)| (key, StoreValue::from(value)))
                    .collect(),
            ),
        }
    }
}
