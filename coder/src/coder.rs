//! The coder facade.
//!
//! [`JsonCoder`] owns a store session plus the customization registry, date
//! format, and conversion mode, and exposes the decode/encode surface on
//! top of them.

use crate::{
    customize::CustomizationRegistry,
    dates::DateFormat,
    decode::{ConversionMode, Decoder},
    encode::Encoder,
    error::Result,
};
use serde_json::Value as Json;
use strata_store::{ObjectId, ObjectStore};

/// Bidirectional coder between JSON documents and stored object graphs.
///
/// One logical write happens per decode call: the payload is fully
/// validated into a creation record first, then committed as a single
/// upsert transaction. Encoding never writes.
#[derive(Debug)]
pub struct JsonCoder {
    store: ObjectStore,
    customs: CustomizationRegistry,
    dates: DateFormat,
    mode: ConversionMode,
}

impl JsonCoder {
    /// Create a coder over a store session, with no customizations, the
    /// ISO-8601 date format, and tolerant conversion.
    pub fn new(store: ObjectStore) -> Self {
        Self {
            store,
            customs: CustomizationRegistry::new(),
            dates: DateFormat::default(),
            mode: ConversionMode::default(),
        }
    }

    /// Builder-style customization registry.
    pub fn with_customizations(mut self, customs: CustomizationRegistry) -> Self {
        self.customs = customs;
        self
    }

    /// Builder-style date format.
    pub fn with_date_format(mut self, dates: DateFormat) -> Self {
        self.dates = dates;
        self
    }

    /// Builder-style conversion mode.
    pub fn with_mode(mut self, mode: ConversionMode) -> Self {
        self.mode = mode;
        self
    }

    /// The underlying store session.
    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Mutable access to the underlying store session.
    pub fn store_mut(&mut self) -> &mut ObjectStore {
        &mut self.store
    }

    /// Consume the coder, returning the store session.
    pub fn into_store(self) -> ObjectStore {
        self.store
    }

    /// The configured date format.
    pub fn date_format(&self) -> &DateFormat {
        &self.dates
    }

    /// The configured conversion mode.
    pub fn mode(&self) -> ConversionMode {
        self.mode
    }

    /// Decode JSON bytes into one persisted object.
    ///
    /// Applies the type's object envelope if declared, builds a validated
    /// creation record, and commits it as a single upsert transaction.
    pub fn decode(&mut self, type_name: &str, bytes: &[u8]) -> Result<ObjectId> {
        let json: Json = serde_json::from_slice(bytes)?;
        self.decode_value(type_name, &json)
    }

    /// Decode an already-parsed JSON value into one persisted object.
    pub fn decode_value(&mut self, type_name: &str, json: &Json) -> Result<ObjectId> {
        self.decoder().decode_value(type_name, json, true)
    }

    /// Decode JSON bytes holding an array (or list-enveloped map) into one
    /// persisted object per element.
    pub fn decode_array(&mut self, type_name: &str, bytes: &[u8]) -> Result<Vec<ObjectId>> {
        let json: Json = serde_json::from_slice(bytes)?;
        self.decode_array_value(type_name, &json)
    }

    /// Decode an already-parsed JSON array value.
    pub fn decode_array_value(&mut self, type_name: &str, json: &Json) -> Result<Vec<ObjectId>> {
        self.decoder().decode_array_value(type_name, json)
    }

    /// Encode one persisted object to pretty, sorted-key JSON bytes.
    ///
    /// Returns `None` when no such object exists.
    pub fn encode(
        &self,
        type_name: &str,
        id: ObjectId,
        use_envelope: bool,
    ) -> Result<Option<Vec<u8>>> {
        match self.encode_value(type_name, id, use_envelope)? {
            Some(json) => Ok(Some(serde_json::to_vec_pretty(&json)?)),
            None => Ok(None),
        }
    }

    /// Encode one persisted object to a JSON value.
    pub fn encode_value(
        &self,
        type_name: &str,
        id: ObjectId,
        use_envelope: bool,
    ) -> Result<Option<Json>> {
        self.encoder().encode_value(type_name, id, use_envelope)
    }

    /// Encode a list of persisted objects to pretty, sorted-key JSON bytes.
    pub fn encode_array(
        &self,
        type_name: &str,
        ids: &[ObjectId],
        use_envelope: bool,
    ) -> Result<Option<Vec<u8>>> {
        match self.encode_array_value(type_name, ids, use_envelope)? {
            Some(json) => Ok(Some(serde_json::to_vec_pretty(&json)?)),
            None => Ok(None),
        }
    }

    /// Encode a list of persisted objects to a JSON value.
    pub fn encode_array_value(
        &self,
        type_name: &str,
        ids: &[ObjectId],
        use_envelope: bool,
    ) -> Result<Option<Json>> {
        self.encoder()
            .encode_array_value(type_name, ids, use_envelope)
    }

    fn decoder(&mut self) -> Decoder<'_> {
        Decoder::new(&mut self.store, &self.customs, &self.dates, self.mode)
    }

    fn encoder(&self) -> Encoder<'_> {
        Encoder::new(&self.store, &self.customs, &self.dates)
    }
}
