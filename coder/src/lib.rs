//! # Strata Coder
//!
//! A bidirectional mapper between JSON documents and schema-described
//! object graphs in a [`strata_store::ObjectStore`].
//!
//! Decoding turns arbitrary JSON into validated creation records and
//! commits them as upserts, recursively across nested and array-valued
//! object references. Encoding walks a persisted object graph back into
//! JSON. Both directions are driven generically by the registered field
//! descriptor tables plus per-type customizations; there is no per-type
//! hand-written mapping code.
//!
//! ## Core Concepts
//!
//! ### Customization
//!
//! A [`TypeCustomization`] declares, per type: storage→external key
//! renames, encode-only ignored fields, raw-JSON-substring string fields,
//! and object/list envelope keys. Unregistered types work with zero
//! configuration.
//!
//! ### Tolerant decoding
//!
//! By default a field whose JSON value does not match its declared kind is
//! skipped, not fatal ([`ConversionMode::Tolerant`]); switch to
//! [`ConversionMode::Strict`] to fail the whole decode instead. Missing and
//! null fields are always skipped: decoding is a partial update that leaves
//! unmentioned stored values untouched.
//!
//! ### Write semantics
//!
//! One decode call is one write transaction. Types with a declared primary
//! key upsert with merge semantics; repeated decodes of payload fragments
//! sharing a key accumulate onto one object.
//!
//! ## Quick Start
//!
//! ```rust
//! use strata_coder::{CustomizationRegistry, JsonCoder, TypeCustomization};
//! use strata_store::{
//!     FieldDescriptor, FieldKind, ObjectSchema, ObjectStore, SchemaRegistry,
//! };
//!
//! // 1. Register the schema
//! let registry = SchemaRegistry::new().with_schema(ObjectSchema::new(
//!     "user",
//!     vec![
//!         FieldDescriptor::primary_key("obj_id", FieldKind::String),
//!         FieldDescriptor::scalar("first_name", FieldKind::String),
//!     ],
//! ));
//!
//! // 2. Register customizations
//! let customs = CustomizationRegistry::new().with_customization(
//!     "user",
//!     TypeCustomization::new().rename("obj_id", "id"),
//! );
//!
//! // 3. Decode external JSON into the store
//! let mut coder = JsonCoder::new(ObjectStore::new(registry)).with_customizations(customs);
//! let id = coder
//!     .decode("user", br#"{"id": "u1", "first_name": "Barry"}"#)
//!     .unwrap();
//!
//! // 4. Encode it back out
//! let bytes = coder.encode("user", id, false).unwrap().unwrap();
//! let text = String::from_utf8(bytes).unwrap();
//! assert!(text.contains("\"id\""));
//! assert!(!text.contains("obj_id"));
//! ```

pub mod coder;
mod convert;
pub mod customize;
pub mod dates;
pub mod decode;
mod encode;
pub mod error;

// Re-export main types at crate root
pub use coder::JsonCoder;
pub use customize::{CustomizationRegistry, TypeCustomization};
pub use dates::DateFormat;
pub use decode::ConversionMode;
pub use error::Error;
