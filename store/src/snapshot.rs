//! Snapshot types for persisting and restoring store state.
//!
//! Snapshots are the bridge between the in-memory store and durable
//! storage. They serialize deterministically: objects are keyed by type and
//! id in sorted maps.

use crate::{error::Result, Error, ObjectId, SchemaRegistry, StoredObject, TypeName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// A point-in-time snapshot of all stored objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Snapshot format version
    pub format_version: u32,
    /// Objects organized by type, then by object id
    pub objects: BTreeMap<TypeName, BTreeMap<ObjectId, StoredObject>>,
    /// Id watermark; the next id the store will assign
    pub next_id: ObjectId,
}

impl StoreSnapshot {
    /// Create a new empty snapshot with the given id watermark.
    pub fn new(next_id: ObjectId) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            objects: BTreeMap::new(),
            next_id,
        }
    }

    /// Add an object to the snapshot.
    pub fn add_object(&mut self, object: StoredObject) {
        self.objects
            .entry(object.type_name().to_string())
            .or_default()
            .insert(object.id(), object);
    }

    /// Get an object from the snapshot.
    pub fn get_object(&self, type_name: &str, id: ObjectId) -> Option<&StoredObject> {
        self.objects.get(type_name)?.get(&id)
    }

    /// Count objects across all types.
    pub fn object_count(&self) -> usize {
        self.objects.values().map(|c| c.len()).sum()
    }

    /// Validate the snapshot against a schema registry.
    pub fn validate(&self, schemas: &SchemaRegistry) -> Result<()> {
        for type_name in self.objects.keys() {
            if !schemas.contains(type_name) {
                return Err(Error::UnknownType(type_name.clone()));
            }
        }

        let max_id = self
            .objects
            .values()
            .flat_map(|c| c.keys())
            .max()
            .copied()
            .unwrap_or(0);
        if max_id >= self.next_id {
            return Err(Error::InvalidSnapshot(format!(
                "id watermark {} does not cover object id {}",
                self.next_id, max_id
            )));
        }

        Ok(())
    }

    /// Serialize to JSON with deterministic ordering.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Serialize to pretty JSON with deterministic ordering.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))?;

        if snapshot.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(Error::InvalidSnapshot(format!(
                "unsupported snapshot format version: {} (max supported: {})",
                snapshot.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        Ok(snapshot)
    }
}
