//! JSON decoding into creation records.
//!
//! The decoder walks the target type's field descriptors in schema order,
//! applying key renames, partial-update skips, per-kind conversion and
//! nested recursion, then validates the finished record and hands it to the
//! store as a single upsert transaction.

use crate::{
    convert,
    customize::{CustomizationRegistry, TypeCustomization},
    dates::DateFormat,
    error::Result,
    Error,
};
use serde_json::{Map, Value as Json};
use strata_store::{
    CreationRecord, FieldDescriptor, FieldKind, FieldValue, ObjectId, ObjectStore, UpdatePolicy,
    Value,
};

/// Policy for JSON values that do not match their field's declared kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionMode {
    /// Skip the mismatched field and keep decoding. Partially-conforming
    /// payloads still produce an object from their valid fields.
    #[default]
    Tolerant,
    /// Fail the whole decode with [`Error::TypeMismatch`].
    Strict,
}

pub(crate) struct Decoder<'a> {
    store: &'a mut ObjectStore,
    customs: &'a CustomizationRegistry,
    dates: &'a DateFormat,
    mode: ConversionMode,
}

impl<'a> Decoder<'a> {
    pub fn new(
        store: &'a mut ObjectStore,
        customs: &'a CustomizationRegistry,
        dates: &'a DateFormat,
        mode: ConversionMode,
    ) -> Self {
        Self {
            store,
            customs,
            dates,
            mode,
        }
    }

    /// Decode one JSON object and commit it as a single upsert.
    ///
    /// The object envelope, when declared, is unwrapped only at the top
    /// level; nested and array-element decodes pass `top_level = false`.
    pub fn decode_value(
        &mut self,
        type_name: &str,
        json: &Json,
        top_level: bool,
    ) -> Result<ObjectId> {
        let map = json.as_object().ok_or(Error::NonObjectTopLevel)?;

        let custom = self.customs.lookup(type_name);
        let effective = match custom.object_envelope_key() {
            Some(envelope) if top_level => {
                map.get(envelope)
                    .and_then(Json::as_object)
                    .ok_or_else(|| Error::EnvelopeNotFound {
                        type_name: type_name.to_string(),
                        envelope: envelope.to_string(),
                    })?
            }
            _ => map,
        };

        let record = self.creation_record(type_name, effective)?;
        self.write(type_name, record)
    }

    /// Decode a JSON array, committing each element as its own upsert.
    ///
    /// The list envelope, when declared, is applied once against the
    /// top-level input; elements never re-apply their object envelope.
    pub fn decode_array_value(&mut self, type_name: &str, json: &Json) -> Result<Vec<ObjectId>> {
        let custom = self.customs.lookup(type_name);

        let array = if let Some(envelope) = custom.list_envelope_key() {
            let map = json.as_object().ok_or(Error::NonObjectTopLevel)?;
            let not_found = || Error::EnvelopeNotFound {
                type_name: type_name.to_string(),
                envelope: envelope.to_string(),
            };
            let array = map
                .get(envelope)
                .and_then(Json::as_array)
                .ok_or_else(not_found)?;
            if !array.iter().all(Json::is_object) {
                return Err(not_found());
            }
            array
        } else {
            let array = json.as_array().ok_or(Error::NonArrayTopLevel)?;
            if !array.iter().all(Json::is_object) {
                return Err(Error::NonArrayTopLevel);
            }
            array
        };

        let mut ids = Vec::with_capacity(array.len());
        for element in array {
            ids.push(self.decode_value(type_name, element, false)?);
        }
        Ok(ids)
    }

    /// Build a validated creation record from a JSON object.
    fn creation_record(&self, type_name: &str, json: &Map<String, Json>) -> Result<CreationRecord> {
        let schema = self
            .store
            .schemas()
            .get(type_name)
            .ok_or_else(|| Error::UnknownType(type_name.to_string()))?;
        let custom = self.customs.lookup(type_name);

        let mut record = CreationRecord::new(type_name);
        for field in &schema.fields {
            let json_key = custom.json_key(&field.name);
            let Some(value) = json.get(json_key) else {
                // Field not in the payload; any stored value stays untouched
                continue;
            };
            if value.is_null() {
                continue;
            }

            if let Some(converted) = self.convert_field(field, custom, value)? {
                record.insert(field.name.clone(), converted);
            }
        }

        if let Some(pk) = schema.primary_key() {
            if !record.contains(&pk.name) {
                return Err(Error::PrimaryKeyMissing {
                    type_name: type_name.to_string(),
                    field: pk.name.clone(),
                });
            }
        }
        if record.is_empty() {
            return Err(Error::EmptyRecord(type_name.to_string()));
        }

        Ok(record)
    }

    fn convert_field(
        &self,
        field: &FieldDescriptor,
        custom: &TypeCustomization,
        json: &Json,
    ) -> Result<Option<FieldValue>> {
        match field.kind {
            FieldKind::Object => {
                let Some(declared) = field.object_type.as_deref() else {
                    return Ok(None);
                };
                if field.is_list {
                    let Some(items) = json.as_array() else {
                        return self.mismatch(field, json);
                    };
                    if !items.iter().all(Json::is_object) {
                        return self.mismatch(field, json);
                    }
                    let mut records = Vec::with_capacity(items.len());
                    for item in items {
                        if let Some(map) = item.as_object() {
                            records.push(self.nested_record(declared, map)?);
                        }
                    }
                    Ok(Some(FieldValue::ObjectList(records)))
                } else {
                    let Some(map) = json.as_object() else {
                        return self.mismatch(field, json);
                    };
                    Ok(Some(FieldValue::Object(self.nested_record(declared, map)?)))
                }
            }
            FieldKind::String if custom.is_raw_json(&field.name) => {
                // Canonical sorted-key text of the sub-document
                let text = serde_json::to_string(json)?;
                Ok(Some(FieldValue::Scalar(Value::String(text))))
            }
            _ => match convert::decode_scalar(field.kind, json, self.dates) {
                Some(value) => Ok(Some(FieldValue::Scalar(value))),
                None => self.mismatch(field, json),
            },
        }
    }

    /// Build a nested record, resolving the concrete type first.
    ///
    /// The discriminator hint is read from the nested JSON map only when the
    /// declared type registered a discriminator key; anything unresolved
    /// falls back to the declared type.
    fn nested_record(&self, declared: &str, json: &Map<String, Json>) -> Result<CreationRecord> {
        let schemas = self.store.schemas();
        let hint = schemas
            .discriminator_key(declared)
            .and_then(|key| json.get(key))
            .and_then(Json::as_str);
        let concrete = schemas.resolve_concrete_type(declared, hint);
        self.creation_record(concrete, json)
    }

    fn mismatch(&self, field: &FieldDescriptor, json: &Json) -> Result<Option<FieldValue>> {
        match self.mode {
            ConversionMode::Tolerant => {
                tracing::debug!(
                    field = %field.name,
                    expected = %field.kind,
                    got = convert::json_type_name(json),
                    "skipping mismatched field"
                );
                Ok(None)
            }
            ConversionMode::Strict => Err(Error::TypeMismatch {
                field: field.name.clone(),
                expected: field.kind.to_string(),
                got: convert::json_type_name(json).to_string(),
            }),
        }
    }

    /// Commit a finished record as one atomic write.
    fn write(&mut self, type_name: &str, record: CreationRecord) -> Result<ObjectId> {
        let policy = if self.store.schemas().primary_key(type_name).is_some() {
            UpdatePolicy::MergeByKey
        } else {
            UpdatePolicy::ErrorOnDuplicate
        };

        self.store.begin_write()?;
        match self.store.upsert(type_name, record, policy) {
            Ok(id) => {
                self.store.commit_write()?;
                Ok(id)
            }
            Err(err) => {
                self.store.rollback_write()?;
                Err(err.into())
            }
        }
    }
}
