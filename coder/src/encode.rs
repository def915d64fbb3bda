//! Encoding persisted objects back to JSON.
//!
//! The encoder walks an object's field descriptors in schema order,
//! applying the same per-type customizations as the decoder in reverse:
//! ignored fields are withheld, storage names are renamed to external keys,
//! raw-JSON strings are re-parsed into sub-documents, dates are formatted,
//! and links recurse into the referenced objects.

use crate::{
    convert, customize::CustomizationRegistry, dates::DateFormat, error::Result, Error,
};
use serde_json::{Map, Value as Json};
use strata_store::{ObjectId, ObjectStore, StoredObject, Value};
use std::collections::HashSet;

pub(crate) struct Encoder<'a> {
    store: &'a ObjectStore,
    customs: &'a CustomizationRegistry,
    dates: &'a DateFormat,
    /// Objects currently on the recursion stack, for cycle detection
    in_progress: HashSet<ObjectId>,
}

impl<'a> Encoder<'a> {
    pub fn new(
        store: &'a ObjectStore,
        customs: &'a CustomizationRegistry,
        dates: &'a DateFormat,
    ) -> Self {
        Self {
            store,
            customs,
            dates,
            in_progress: HashSet::new(),
        }
    }

    /// Encode one object to a JSON value.
    ///
    /// Returns `None` when no such object exists; callers distinguish "no
    /// object" from "object with no visible fields" (an empty JSON map).
    pub fn encode_value(
        &mut self,
        type_name: &str,
        id: ObjectId,
        use_envelope: bool,
    ) -> Result<Option<Json>> {
        let Some(object) = self.store.get(type_name, id) else {
            return Ok(None);
        };
        let json = self.object_json(object)?;

        let custom = self.customs.lookup(type_name);
        Ok(Some(match custom.object_envelope_key() {
            Some(envelope) if use_envelope => wrap(envelope, json),
            _ => json,
        }))
    }

    /// Encode a list of objects to a JSON array.
    ///
    /// Missing ids are skipped; an empty input yields an empty array.
    pub fn encode_array_value(
        &mut self,
        type_name: &str,
        ids: &[ObjectId],
        use_envelope: bool,
    ) -> Result<Option<Json>> {
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(object) = self.store.get(type_name, *id) {
                items.push(self.object_json(object)?);
            }
        }
        let json = Json::Array(items);

        let custom = self.customs.lookup(type_name);
        Ok(Some(match custom.list_envelope_key() {
            Some(envelope) if use_envelope => wrap(envelope, json),
            _ => json,
        }))
    }

    fn object_json(&mut self, object: &StoredObject) -> Result<Json> {
        if !self.in_progress.insert(object.id()) {
            return Err(Error::CyclicReference(object.type_name().to_string()));
        }
        let result = self.fields_json(object);
        self.in_progress.remove(&object.id());
        result
    }

    fn fields_json(&mut self, object: &StoredObject) -> Result<Json> {
        let store = self.store;
        let type_name = object.type_name();
        let schema = store
            .schemas()
            .get(type_name)
            .ok_or_else(|| Error::UnknownType(type_name.to_string()))?;
        let custom = self.customs.lookup(type_name);

        let mut json = Map::new();
        for field in &schema.fields {
            if custom.is_ignored(&field.name) {
                continue;
            }
            let Some(value) = object.get(&field.name) else {
                continue;
            };
            let json_key = custom.json_key(&field.name).to_string();

            match value {
                Value::String(text) if custom.is_raw_json(&field.name) => {
                    // Inverse of the decoder's raw capture: the stored text
                    // is itself a JSON document
                    match serde_json::from_str::<Json>(text) {
                        Ok(parsed) => {
                            json.insert(json_key, parsed);
                        }
                        Err(err) => {
                            tracing::warn!(
                                field = %field.name,
                                %err,
                                "failed to parse raw JSON stored as string"
                            );
                        }
                    }
                }
                Value::Link(target) => match store.get_by_id(*target) {
                    Some(nested) => {
                        json.insert(json_key, self.object_json(nested)?);
                    }
                    None => {
                        tracing::warn!(field = %field.name, id = *target, "dangling link");
                    }
                },
                Value::LinkList(targets) => {
                    let mut items = Vec::with_capacity(targets.len());
                    for target in targets {
                        match store.get_by_id(*target) {
                            Some(nested) => items.push(self.object_json(nested)?),
                            None => {
                                tracing::warn!(field = %field.name, id = *target, "dangling link")
                            }
                        }
                    }
                    json.insert(json_key, Json::Array(items));
                }
                scalar => {
                    if let Some(encoded) = convert::encode_scalar(scalar, self.dates) {
                        json.insert(json_key, encoded);
                    }
                }
            }
        }

        Ok(Json::Object(json))
    }
}

fn wrap(envelope: &str, json: Json) -> Json {
    let mut wrapper = Map::new();
    wrapper.insert(envelope.to_string(), json);
    Json::Object(wrapper)
}
