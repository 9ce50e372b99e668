//! Store-native → transport-safe conversion.

use serde_json::{Map, Number, Value};
use time::format_description::well_known::Rfc3339;

use crate::domain::document::{Document, ID_FIELD, StoreValue};

/// Convert a store value into JSON: row identities are dropped under
/// [`ID_FIELD`] and rendered as strings elsewhere, timestamps become RFC 3339
/// text, containers are rebuilt recursively.
pub fn serialize(value: &StoreValue) -> Value {
    match value {
        StoreValue::Null => Value::Null,
        StoreValue::Bool(flag) => Value::Bool(*flag),
        StoreValue::Int(int) => Value::Number((*int).into()),
        StoreValue::Float(float) => Number::from_f64(*float).map_or(Value::Null, Value::Number),
        StoreValue::String(text) => Value::String(text.clone()),
        StoreValue::ObjectId(id) => Value::String(id.to_string()),
        StoreValue::Timestamp(at) => match at.format(&Rfc3339) {
            Ok(text) => Value::String(text),
            // Years outside 0..=9999 have no RFC 3339 form.
            Err(_) => Value::String(at.to_string()),
        },
        StoreValue::Array(items) => Value::Array(items.iter().map(serialize).collect()),
        StoreValue::Document(doc) => serialize_document(doc),
    }
}

pub fn serialize_document(doc: &Document) -> Value {
    let map: Map<String, Value> = doc
        .iter()
        .filter(|(key, _)| key.as_str() != ID_FIELD)
        .map(|(key, value)| (key.clone(), serialize(value)))
        .collect();
    Value::Object(map)
}

pub fn serialize_documents<I>(docs: I) -> Value
where
    I: IntoIterator<Item = Document>,
{
    Value::Array(docs.into_iter().map(|doc| serialize_document(&doc)).collect())
}
