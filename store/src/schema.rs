//! Schema definition and registration.
//!
//! Every persisted type is described by an ordered table of field
//! descriptors, registered once at type-registration time. Decoders and
//! encoders drive themselves entirely from these tables; there is no
//! runtime reflection anywhere.

use crate::{error::Result, Error, FieldName, TypeName};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Field kinds supported in schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Bool,
    /// Exact `i64`
    Int,
    /// Exact `f32`
    Float,
    /// Exact `f64`
    Double,
    String,
    /// Binary payload, exchanged as the JSON codec's native byte encoding
    Bytes,
    /// UTC datetime, exchanged as a formatted string
    Date,
    /// Reference to another schema-described type
    Object,
    /// Scalar-only dynamic value
    Any,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Bool => write!(f, "Bool"),
            FieldKind::Int => write!(f, "Int"),
            FieldKind::Float => write!(f, "Float"),
            FieldKind::Double => write!(f, "Double"),
            FieldKind::String => write!(f, "String"),
            FieldKind::Bytes => write!(f, "Bytes"),
            FieldKind::Date => write!(f, "Date"),
            FieldKind::Object => write!(f, "Object"),
            FieldKind::Any => write!(f, "Any"),
        }
    }
}

/// Description of a single field of a persisted type.
///
/// Descriptors are immutable for the lifetime of a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Storage identifier of the field
    pub name: FieldName,
    /// Field kind
    pub kind: FieldKind,
    /// List-valued; only valid for [`FieldKind::Object`]
    pub is_list: bool,
    /// Referenced type name, present iff kind is [`FieldKind::Object`]
    pub object_type: Option<TypeName>,
    /// Declared primary key of the owning type
    pub primary_key: bool,
}

impl FieldDescriptor {
    /// A scalar field of the given kind.
    pub fn scalar(name: impl Into<FieldName>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_list: false,
            object_type: None,
            primary_key: false,
        }
    }

    /// A scalar field flagged as the owning type's primary key.
    pub fn primary_key(name: impl Into<FieldName>, kind: FieldKind) -> Self {
        Self {
            primary_key: true,
            ..Self::scalar(name, kind)
        }
    }

    /// A single nested object reference.
    pub fn object(name: impl Into<FieldName>, object_type: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Object,
            is_list: false,
            object_type: Some(object_type.into()),
            primary_key: false,
        }
    }

    /// A list of nested object references.
    pub fn object_list(name: impl Into<FieldName>, object_type: impl Into<TypeName>) -> Self {
        Self {
            is_list: true,
            ..Self::object(name, object_type)
        }
    }
}

/// Schema for one persisted type: an ordered field descriptor table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSchema {
    /// Type name
    pub name: TypeName,
    /// Field descriptors in declaration order
    pub fields: Vec<FieldDescriptor>,
}

impl ObjectSchema {
    /// Create a new object schema.
    pub fn new(name: impl Into<TypeName>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Look up a field descriptor by storage name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The declared primary key field, if any.
    pub fn primary_key(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.primary_key)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::InvalidSchema {
            type_name: self.name.clone(),
            reason,
        };

        let mut pk_count = 0;
        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(invalid(format!("duplicate field '{}'", field.name)));
            }

            match field.kind {
                FieldKind::Object => {
                    if field.object_type.is_none() {
                        return Err(invalid(format!(
                            "object field '{}' has no object type",
                            field.name
                        )));
                    }
                }
                _ => {
                    if field.object_type.is_some() {
                        return Err(invalid(format!(
                            "non-object field '{}' declares an object type",
                            field.name
                        )));
                    }
                    if field.is_list {
                        return Err(invalid(format!(
                            "list field '{}' must be of object kind",
                            field.name
                        )));
                    }
                }
            }

            if field.primary_key {
                pk_count += 1;
                if !matches!(field.kind, FieldKind::Int | FieldKind::String) {
                    return Err(invalid(format!(
                        "primary key '{}' must be Int or String, got {}",
                        field.name, field.kind
                    )));
                }
            }
        }

        if pk_count > 1 {
            return Err(invalid("more than one primary key".into()));
        }

        Ok(())
    }
}

/// Registry of type schemas, plus the concrete-type resolution tables for
/// polymorphic nested objects.
///
/// Lookup is by exact type name. Subtype resolution is explicit: a declared
/// type may name a discriminator JSON key, and (declared, discriminator
/// value) pairs map to concrete registered types. Anything unresolved falls
/// back to the declared type.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<TypeName, ObjectSchema>,
    discriminators: HashMap<TypeName, FieldName>,
    subtypes: HashMap<(TypeName, String), TypeName>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type schema, validating its descriptor table.
    pub fn register(&mut self, schema: ObjectSchema) -> Result<()> {
        schema.validate()?;
        self.schemas.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Builder-style registration; panics on an invalid schema.
    pub fn with_schema(mut self, schema: ObjectSchema) -> Self {
        if let Err(e) = self.register(schema) {
            panic!("invalid schema: {}", e);
        }
        self
    }

    /// Get a schema by type name.
    pub fn get(&self, name: &str) -> Option<&ObjectSchema> {
        self.schemas.get(name)
    }

    /// Get a schema by type name, failing for unregistered names.
    pub fn schema_for(&self, name: &str) -> Result<&ObjectSchema> {
        self.schemas
            .get(name)
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    /// Check whether a type is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// The declared primary key field of a type, if any.
    pub fn primary_key(&self, name: &str) -> Option<&FieldDescriptor> {
        self.schemas.get(name).and_then(|s| s.primary_key())
    }

    /// Registered type names.
    pub fn type_names(&self) -> impl Iterator<Item = &TypeName> {
        self.schemas.keys()
    }

    /// Declare the JSON key that discriminates subtypes of `declared`.
    pub fn set_discriminator(
        &mut self,
        declared: impl Into<TypeName>,
        json_key: impl Into<FieldName>,
    ) {
        self.discriminators.insert(declared.into(), json_key.into());
    }

    /// The discriminator JSON key registered for a declared type, if any.
    pub fn discriminator_key(&self, declared: &str) -> Option<&str> {
        self.discriminators.get(declared).map(String::as_str)
    }

    /// Map a discriminator value to a concrete subtype of `declared`.
    pub fn register_subtype(
        &mut self,
        declared: impl Into<TypeName>,
        hint: impl Into<String>,
        concrete: impl Into<TypeName>,
    ) {
        self.subtypes
            .insert((declared.into(), hint.into()), concrete.into());
    }

    /// Resolve a declared nested type plus an optional discriminator hint to
    /// the concrete type to use.
    ///
    /// Falls back to the declared name when the hint is absent, unmapped, or
    /// maps to an unregistered type.
    pub fn resolve_concrete_type<'a>(&'a self, declared: &'a str, hint: Option<&str>) -> &'a str {
        let Some(hint) = hint else {
            return declared;
        };
        match self.subtypes.get(&(declared.to_string(), hint.to_string())) {
            Some(concrete) if self.contains(concrete) => concrete.as_str(),
            _ => declared,
        }
    }
}
