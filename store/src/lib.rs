//! # Strata Store
//!
//! An embedded object store for schema-described object graphs.
//!
//! The store holds typed objects whose shapes are declared once, at
//! type-registration time, as ordered field descriptor tables. Writes are
//! expressed as creation records executed inside scoped transactions, with
//! upsert-by-primary-key semantics across nested object graphs.
//!
//! ## Design Principles
//!
//! - **No IO**: the store has no knowledge of files or the network;
//!   persistence goes through [`StoreSnapshot`]
//! - **No reflection**: decoding and encoding layers drive themselves from
//!   registered [`FieldDescriptor`] tables, never from runtime type
//!   inspection
//! - **Atomic writes**: a record tree is committed or rolled back as a unit,
//!   so readers never observe a partially written graph
//!
//! ## Core Concepts
//!
//! ### Schemas
//!
//! Every persisted type registers an [`ObjectSchema`]: an ordered list of
//! [`FieldDescriptor`]s (name, kind, list flag, nested type, primary key).
//! The [`SchemaRegistry`] also carries explicit subtype tables for resolving
//! polymorphic nested objects by discriminator hint.
//!
//! ### Creation Records
//!
//! A [`CreationRecord`] is a transient, storage-ready field/value mapping.
//! Nested objects are embedded as nested records and resolved to links by
//! the store during the upsert.
//!
//! ### Upserts
//!
//! [`ObjectStore::upsert`] merges into an existing object when the type
//! declares a primary key and an equal key value exists
//! ([`UpdatePolicy::MergeByKey`]), or rejects the duplicate
//! ([`UpdatePolicy::ErrorOnDuplicate`]). Types without a primary key always
//! create fresh objects.
//!
//! ## Quick Start
//!
//! ```rust
//! use strata_store::{
//!     CreationRecord, FieldDescriptor, FieldKind, FieldValue, ObjectSchema,
//!     ObjectStore, SchemaRegistry, UpdatePolicy, Value,
//! };
//!
//! // 1. Register a schema
//! let registry = SchemaRegistry::new().with_schema(ObjectSchema::new(
//!     "user",
//!     vec![
//!         FieldDescriptor::primary_key("obj_id", FieldKind::String),
//!         FieldDescriptor::scalar("name", FieldKind::String),
//!     ],
//! ));
//!
//! // 2. Create a store
//! let mut store = ObjectStore::new(registry);
//!
//! // 3. Upsert a record inside a write transaction
//! let mut record = CreationRecord::new("user");
//! record.insert("obj_id", FieldValue::Scalar(Value::String("u1".into())));
//! record.insert("name", FieldValue::Scalar(Value::String("Alice".into())));
//!
//! store.begin_write().unwrap();
//! let id = store.upsert("user", record, UpdatePolicy::MergeByKey).unwrap();
//! store.commit_write().unwrap();
//!
//! // 4. Read it back
//! let user = store.get("user", id).unwrap();
//! assert_eq!(user.get("name").unwrap().as_str(), Some("Alice"));
//! ```

pub mod error;
pub mod record;
pub mod schema;
pub mod snapshot;
pub mod store;
pub mod value;

// Re-export main types at crate root
pub use error::Error;
pub use record::{CreationRecord, FieldValue};
pub use schema::{FieldDescriptor, FieldKind, ObjectSchema, SchemaRegistry};
pub use snapshot::{StoreSnapshot, SNAPSHOT_FORMAT_VERSION};
pub use store::{ObjectStore, StoredObject, UpdatePolicy};
pub use value::{AnyValue, Value};

/// Type aliases for clarity
pub type TypeName = String;
pub type FieldName = String;
pub type ObjectId = u64;
