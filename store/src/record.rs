//! Creation records.
//!
//! A [`CreationRecord`] is the intermediate, storage-ready field/value
//! mapping built by a decoder before any write occurs. Records are transient:
//! each one is consumed by exactly one upsert and then discarded.

use crate::{FieldName, TypeName, Value};

/// A single field value inside a creation record.
///
/// Nested object references are carried as embedded records here, not as
/// links; the store resolves them to links during the upsert.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(Value),
    Object(CreationRecord),
    ObjectList(Vec<CreationRecord>),
}

/// An ordered mapping from storage field name to a converted value.
///
/// Field order follows insertion order, which for decoded records is the
/// owning type's schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct CreationRecord {
    type_name: TypeName,
    fields: Vec<(FieldName, FieldValue)>,
}

impl CreationRecord {
    /// Create an empty record for the given type.
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// The type this record creates or merges into.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Set a field value, replacing any existing entry in place.
    pub fn insert(&mut self, name: impl Into<FieldName>, value: FieldValue) {
        let name = name.into();
        if let Some(entry) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Check whether a field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Number of fields in the record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n, v))
    }
}

impl IntoIterator for CreationRecord {
    type Item = (FieldName, FieldValue);
    type IntoIter = std::vec::IntoIter<(FieldName, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
