//! Document wire format.
//!
//! The document store wraps every field in a typed envelope
//! (`{"stringValue": "..."}`, `{"integerValue": "3"}`, ...). Orders are
//! plain serde types, so conversion goes through `serde_json::Value`:
//! `Order -> serde_json::Value -> fields` on write and the reverse on read.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::BackendError;

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    /// 64-bit integers travel as decimal strings.
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(serde_json::Value),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

/// An array field. Empty arrays omit `values`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Value>,
}

/// A nested map field. Empty maps omit `fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Value>,
}

/// A stored document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name (`projects/.../documents/orders/{id}`).
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default)]
    pub create_time: Option<String>,
}

/// One element of a `runQuery` response stream.
///
/// Elements without a `document` only report the read time; a query with
/// no matches returns exactly one such element.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub document: Option<Document>,
    #[serde(default)]
    pub read_time: Option<String>,
}

/// Body for creating a document.
#[derive(Debug, Serialize)]
pub struct WriteDocument {
    pub fields: BTreeMap<String, Value>,
}

/// Build a `runQuery` body matching documents whose `field` equals `value`.
#[must_use]
pub fn field_equals_query(
    collection: &str,
    field: &str,
    value: &str,
    limit: u32,
) -> serde_json::Value {
    serde_json::json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": { "stringValue": value }
                }
            },
            "limit": limit
        }
    })
}

/// Encode a serializable struct into document fields.
///
/// # Errors
///
/// Returns `BackendError::Decode` if `value` does not serialize to a JSON
/// object, or `BackendError::Parse` if serialization fails.
pub fn encode_fields<T: Serialize>(value: &T) -> Result<BTreeMap<String, Value>, BackendError> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, to_value(v)))
            .collect()),
        other => Err(BackendError::Decode(format!(
            "expected an object at the document root, got {other}"
        ))),
    }
}

/// Decode document fields into a deserializable struct.
///
/// # Errors
///
/// Returns an error if a field cannot be converted or the result does not
/// match `T`.
pub fn decode_fields<T: DeserializeOwned>(
    fields: BTreeMap<String, Value>,
) -> Result<T, BackendError> {
    let object = fields
        .into_iter()
        .map(|(k, v)| from_value(v).map(|v| (k, v)))
        .collect::<Result<serde_json::Map<_, _>, _>>()?;
    Ok(serde_json::from_value(serde_json::Value::Object(object))?)
}

/// Convert a JSON value into a typed field value.
#[must_use]
pub fn to_value(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::NullValue(()),
        serde_json::Value::Bool(b) => Value::BooleanValue(b),
        serde_json::Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Value::IntegerValue(n.to_string())
            } else {
                Value::DoubleValue(n.as_f64().unwrap_or_default())
            }
        }
        serde_json::Value::String(s) => Value::StringValue(s),
        serde_json::Value::Array(items) => Value::ArrayValue(ArrayValue {
            values: items.into_iter().map(to_value).collect(),
        }),
        serde_json::Value::Object(map) => Value::MapValue(MapValue {
            fields: map.into_iter().map(|(k, v)| (k, to_value(v))).collect(),
        }),
    }
}

/// Convert a typed field value back into JSON.
///
/// Timestamps, bytes and references come back as strings.
///
/// # Errors
///
/// Returns `BackendError::Decode` for an integer that is not a valid `i64`.
pub fn from_value(value: Value) -> Result<serde_json::Value, BackendError> {
    Ok(match value {
        Value::NullValue(()) => serde_json::Value::Null,
        Value::BooleanValue(b) => serde_json::Value::Bool(b),
        Value::IntegerValue(s) => {
            let n = s
                .parse::<i64>()
                .map_err(|e| BackendError::Decode(format!("integerValue {s:?}: {e}")))?;
            serde_json::Value::from(n)
        }
        Value::DoubleValue(f) => serde_json::Number::from_f64(f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::TimestampValue(s)
        | Value::StringValue(s)
        | Value::BytesValue(s)
        | Value::ReferenceValue(s) => serde_json::Value::String(s),
        Value::GeoPointValue(v) => v,
        Value::ArrayValue(array) => serde_json::Value::Array(
            array
                .values
                .into_iter()
                .map(from_value)
                .collect::<Result<_, _>>()?,
        ),
        Value::MapValue(map) => serde_json::Value::Object(
            map.fields
                .into_iter()
                .map(|(k, v)| from_value(v).map(|v| (k, v)))
                .collect::<Result<_, _>>()?,
        ),
    })
}
