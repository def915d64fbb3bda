//! Per-type coding customization.
//!
//! Customization is static metadata registered once per type: how storage
//! field names map to external JSON keys, which fields are withheld from
//! encoded output, which string fields hold raw JSON text, and what envelope
//! keys wrap the type's payloads.

use std::collections::{HashMap, HashSet};
use strata_store::{FieldName, TypeName};

/// Static coding metadata for one persisted type.
#[derive(Debug, Clone, Default)]
pub struct TypeCustomization {
    key_renames: HashMap<FieldName, String>,
    ignored_fields: HashSet<FieldName>,
    raw_json_fields: HashSet<FieldName>,
    object_envelope: Option<String>,
    list_envelope: Option<String>,
}

impl TypeCustomization {
    /// Customization with no renames, no ignores, no raw fields, no
    /// envelopes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a storage field name to a different external JSON key.
    ///
    /// Unmapped fields use the storage name verbatim.
    pub fn rename(mut self, storage: impl Into<FieldName>, external: impl Into<String>) -> Self {
        self.key_renames.insert(storage.into(), external.into());
        self
    }

    /// Withhold a field from encoded output.
    ///
    /// Ignoring applies to encoding only: an ignored field can still be set
    /// by a decode. This keeps write-only internal fields ingestible without
    /// ever leaking them into produced JSON.
    pub fn ignore(mut self, field: impl Into<FieldName>) -> Self {
        self.ignored_fields.insert(field.into());
        self
    }

    /// Declare a string field whose stored value is the raw JSON text of a
    /// sub-document rather than a plain string.
    pub fn raw_json(mut self, field: impl Into<FieldName>) -> Self {
        self.raw_json_fields.insert(field.into());
        self
    }

    /// Declare the key wrapping this type's object payload in external JSON.
    ///
    /// For example, a `user` object with envelope `"user"` arrives as:
    ///
    /// ```json
    /// { "user": { "first_name": "...", "last_name": "..." } }
    /// ```
    pub fn object_envelope(mut self, key: impl Into<String>) -> Self {
        self.object_envelope = Some(key.into());
        self
    }

    /// Declare the key wrapping this type's list payloads in external JSON.
    pub fn list_envelope(mut self, key: impl Into<String>) -> Self {
        self.list_envelope = Some(key.into());
        self
    }

    /// The external JSON key for a storage field.
    pub fn json_key<'a>(&'a self, field: &'a str) -> &'a str {
        self.key_renames.get(field).map_or(field, String::as_str)
    }

    /// Whether a field is withheld from encoded output.
    pub fn is_ignored(&self, field: &str) -> bool {
        self.ignored_fields.contains(field)
    }

    /// Whether a string field holds raw JSON text.
    pub fn is_raw_json(&self, field: &str) -> bool {
        self.raw_json_fields.contains(field)
    }

    /// The object envelope key, if declared.
    pub fn object_envelope_key(&self) -> Option<&str> {
        self.object_envelope.as_deref()
    }

    /// The list envelope key, if declared.
    pub fn list_envelope_key(&self) -> Option<&str> {
        self.list_envelope.as_deref()
    }
}

/// Registry of per-type customizations.
///
/// Lookup is by exact type name; unregistered types get a shared empty
/// default, so every persisted type is usable with zero configuration.
/// Customization is never inherited: a type standing in for another must
/// register its own entry.
#[derive(Debug, Clone, Default)]
pub struct CustomizationRegistry {
    by_type: HashMap<TypeName, TypeCustomization>,
    default: TypeCustomization,
}

impl CustomizationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type's customization, replacing any previous entry.
    pub fn register(&mut self, type_name: impl Into<TypeName>, customization: TypeCustomization) {
        self.by_type.insert(type_name.into(), customization);
    }

    /// Builder-style registration.
    pub fn with_customization(
        mut self,
        type_name: impl Into<TypeName>,
        customization: TypeCustomization,
    ) -> Self {
        self.register(type_name, customization);
        self
    }

    /// Look up a type's customization, falling back to the empty default.
    pub fn lookup(&self, type_name: &str) -> &TypeCustomization {
        self.by_type.get(type_name).unwrap_or(&self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_key_defaults_to_storage_name() {
        let custom = TypeCustomization::new().rename("obj_id", "id");

        assert_eq!(custom.json_key("obj_id"), "id");
        assert_eq!(custom.json_key("username"), "username");
    }

    #[test]
    fn builder_accumulates() {
        let custom = TypeCustomization::new()
            .rename("first_name", "firstName")
            .ignore("secret")
            .raw_json("centroid")
            .object_envelope("user")
            .list_envelope("users");

        assert_eq!(custom.json_key("first_name"), "firstName");
        assert!(custom.is_ignored("secret"));
        assert!(!custom.is_ignored("first_name"));
        assert!(custom.is_raw_json("centroid"));
        assert_eq!(custom.object_envelope_key(), Some("user"));
        assert_eq!(custom.list_envelope_key(), Some("users"));
    }

    #[test]
    fn lookup_falls_back_to_default() {
        let registry = CustomizationRegistry::new()
            .with_customization("user", TypeCustomization::new().rename("obj_id", "id"));

        assert_eq!(registry.lookup("user").json_key("obj_id"), "id");

        // Unregistered type: identity mapping, nothing ignored, no envelopes
        let fallback = registry.lookup("muppet");
        assert_eq!(fallback.json_key("obj_id"), "obj_id");
        assert!(!fallback.is_ignored("obj_id"));
        assert_eq!(fallback.object_envelope_key(), None);
    }

    #[test]
    fn no_inheritance_between_types() {
        let registry = CustomizationRegistry::new()
            .with_customization("vehicle", TypeCustomization::new().rename("obj_id", "id"));

        // A subtype must register its own renames
        assert_eq!(registry.lookup("car").json_key("obj_id"), "obj_id");
    }
}
