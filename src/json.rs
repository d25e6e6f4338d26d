//! JSON <-> Value conversion utilities
//!
//! Engines that exchange tuples as JSON can bridge them into [`Value`]s here.
//! JSON has no timestamp or blob type, so [`to_json_value`] renders them as
//! RFC 3339 and base64 strings; [`from_json`] never produces them.

use std::collections::HashMap;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::SecondsFormat;

use crate::error::ConversionError;
use crate::value::Value;

/// Convert serde_json::Value to Value
///
/// Integers outside the `i64` range are rejected rather than approximated
/// by a float.
pub fn from_json(v: serde_json::Value) -> Result<Value, ConversionError> {
    match v {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Boolean(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if n.is_u64() {
                Err(ConversionError::lossy("integer", n))
            } else {
                n.as_f64()
                    .map(Value::Float)
                    .ok_or_else(|| ConversionError::lossy("float", n))
            }
        }
        serde_json::Value::String(s) => Ok(Value::String(s)),
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .enumerate()
            .map(|(index, item)| from_json(item).map_err(|e| ConversionError::element(index, e)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_json::Value::Object(obj) => obj
            .into_iter()
            .map(|(k, v)| match from_json(v) {
                Ok(value) => Ok((k, value)),
                Err(e) => Err(ConversionError::field(k, e)),
            })
            .collect::<Result<HashMap<_, _>, _>>()
            .map(Value::Object),
    }
}

/// Convert Value to serde_json::Value
pub fn to_json_value(v: Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        // NaN and infinities have no JSON form
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::Timestamp(t) => {
            serde_json::Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        }
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(to_json_value).collect()),
        Value::Object(obj) => serde_json::Value::Object(
            obj.into_iter()
                .map(|(k, v)| (k, to_json_value(v)))
                .collect(),
        ),
        Value::Blob(bytes) => serde_json::Value::String(STANDARD.encode(bytes)),
    }
}
