//! Scalar value conversion.
//!
//! Stateless per-kind conversion between JSON values and storage-native
//! values, shared by the decoder and encoder and parameterized by the
//! configured [`DateFormat`].
//!
//! Numeric kinds are exact: a JSON number that cannot be represented
//! exactly as the target kind is a mismatch, never a coercion.

use crate::dates::DateFormat;
use serde_json::Value as Json;
use strata_store::{AnyValue, FieldKind, Value};

/// Largest integer magnitude exactly representable as an f64.
const MAX_SAFE_F64_INT: u64 = 1 << 53;

/// Convert a JSON value to the storage-native value of a scalar kind.
///
/// Returns `None` on a kind mismatch. [`FieldKind::Object`] is not a scalar
/// kind and always returns `None`; nested objects are the decoder's job.
pub(crate) fn decode_scalar(kind: FieldKind, json: &Json, dates: &DateFormat) -> Option<Value> {
    match kind {
        FieldKind::Bool => json.as_bool().map(Value::Bool),
        FieldKind::Int => json.as_i64().map(Value::Int),
        FieldKind::Float => exact_f64(json).and_then(|double| {
            let float = double as f32;
            (f64::from(float) == double).then_some(Value::Float(float))
        }),
        FieldKind::Double => exact_f64(json).map(Value::Double),
        FieldKind::String => json.as_str().map(|s| Value::String(s.to_string())),
        FieldKind::Bytes => decode_bytes(json).map(Value::Bytes),
        FieldKind::Date => json
            .as_str()
            .and_then(|text| dates.parse(text))
            .map(Value::Date),
        FieldKind::Any => decode_any(json).map(Value::Any),
        FieldKind::Object => None,
    }
}

/// Convert a storage-native value back to its canonical JSON representation.
///
/// Links are not scalar values and return `None`; resolving them is the
/// encoder's job.
pub(crate) fn encode_scalar(value: &Value, dates: &DateFormat) -> Option<Json> {
    match value {
        Value::Bool(b) => Some(Json::Bool(*b)),
        Value::Int(i) => Some(Json::from(*i)),
        Value::Float(f) => serde_json::Number::from_f64(f64::from(*f)).map(Json::Number),
        Value::Double(d) => serde_json::Number::from_f64(*d).map(Json::Number),
        Value::String(s) => Some(Json::String(s.clone())),
        Value::Bytes(bytes) => Some(Json::Array(
            bytes.iter().map(|b| Json::from(u64::from(*b))).collect(),
        )),
        Value::Date(date) => Some(Json::String(dates.format(date))),
        Value::Any(any) => Some(encode_any(any)),
        Value::Link(_) | Value::LinkList(_) => None,
    }
}

/// The value of a JSON number, if it is exactly representable as an f64.
///
/// Float tokens are exact by construction; integer tokens qualify only
/// within the 2^53 safe range.
fn exact_f64(json: &Json) -> Option<f64> {
    let Json::Number(number) = json else {
        return None;
    };
    if number.is_f64() {
        return number.as_f64();
    }
    if let Some(int) = number.as_i64() {
        return (int.unsigned_abs() <= MAX_SAFE_F64_INT).then_some(int as f64);
    }
    if let Some(uint) = number.as_u64() {
        return (uint <= MAX_SAFE_F64_INT).then_some(uint as f64);
    }
    None
}

/// Binary payloads use the JSON codec's native byte encoding: an array of
/// integers in 0..=255.
fn decode_bytes(json: &Json) -> Option<Vec<u8>> {
    json.as_array()?
        .iter()
        .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
        .collect()
}

fn decode_any(json: &Json) -> Option<AnyValue> {
    match json {
        Json::Null => Some(AnyValue::Null),
        Json::Bool(b) => Some(AnyValue::Bool(*b)),
        Json::Number(n) => n
            .as_i64()
            .map(AnyValue::Int)
            .or_else(|| n.as_f64().map(AnyValue::Double)),
        Json::String(s) => Some(AnyValue::String(s.clone())),
        Json::Array(_) | Json::Object(_) => None,
    }
}

fn encode_any(any: &AnyValue) -> Json {
    match any {
        AnyValue::Null => Json::Null,
        AnyValue::Bool(b) => Json::Bool(*b),
        AnyValue::Int(i) => Json::from(*i),
        AnyValue::Double(d) => serde_json::Number::from_f64(*d)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        AnyValue::String(s) => Json::String(s.clone()),
    }
}

/// Name of a JSON value's type, for diagnostics.
pub(crate) fn json_type_name(json: &Json) -> &'static str {
    match json {
        Json::Null => "Null",
        Json::Bool(_) => "Bool",
        Json::Number(n) if n.is_i64() || n.is_u64() => "Int",
        Json::Number(_) => "Float",
        Json::String(_) => "String",
        Json::Array(_) => "Array",
        Json::Object(_) => "Object",
    }
}
