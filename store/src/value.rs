//! Storage-native values.
//!
//! A [`Value`] is the converted, storage-ready form of a single field.
//! Nested object references are held as links to store-assigned object ids,
//! never as inline sub-objects.

use crate::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The opaque "any" kind, restricted to the finite JSON scalar kinds.
///
/// Objects and arrays are deliberately not representable here; open-ended
/// dynamic values are limited to scalars so conversion stays exhaustive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnyValue {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
}

impl AnyValue {
    /// Check for the null variant.
    pub fn is_null(&self) -> bool {
        matches!(self, AnyValue::Null)
    }
}

/// A single stored field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Date(DateTime<Utc>),
    /// Reference to a single stored object
    Link(ObjectId),
    /// References to a list of stored objects
    LinkList(Vec<ObjectId>),
    Any(AnyValue),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<ObjectId> {
        match self {
            Value::Link(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_link_list(&self) -> Option<&[ObjectId]> {
        match self {
            Value::LinkList(ids) => Some(ids),
            _ => None,
        }
    }

    pub fn as_any(&self) -> Option<&AnyValue> {
        match self {
            Value::Any(v) => Some(v),
            _ => None,
        }
    }

    /// Name of this value's kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Double(_) => "Double",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
            Value::Date(_) => "Date",
            Value::Link(_) => "Link",
            Value::LinkList(_) => "LinkList",
            Value::Any(_) => "Any",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Date(d) => write!(f, "{}", d.to_rfc3339()),
            Value::Link(id) => write!(f, "link({})", id),
            Value::LinkList(ids) => write!(f, "links({})", ids.len()),
            Value::Any(AnyValue::Null) => write!(f, "null"),
            Value::Any(AnyValue::Bool(b)) => write!(f, "{}", b),
            Value::Any(AnyValue::Int(i)) => write!(f, "{}", i),
            Value::Any(AnyValue::Double(d)) => write!(f, "{}", d),
            Value::Any(AnyValue::String(s)) => write!(f, "\"{}\"", s),
        }
    }
}
