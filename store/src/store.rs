//! ObjectStore - the embedded object container.
//!
//! The store holds typed objects keyed by store-assigned ids, and executes
//! creation records as upserts inside scoped write transactions. Nested
//! records are resolved to links recursively, so one upsert call writes a
//! whole object graph.

use crate::{
    error::Result, CreationRecord, Error, FieldKind, FieldName, FieldValue, ObjectId,
    SchemaRegistry, TypeName, Value,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A persisted object: a store-assigned id plus its field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    id: ObjectId,
    type_name: TypeName,
    fields: BTreeMap<FieldName, Value>,
}

impl StoredObject {
    /// The store-assigned object id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The schema type of this object.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Get a field value by storage name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Check whether a field has a stored value.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterate stored fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldName, &Value)> {
        self.fields.iter()
    }
}

/// Policy applied when an upsert targets a type with a declared primary key
/// and an object with the same key value already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Merge the record's fields into the existing object
    MergeByKey,
    /// Fail with [`Error::DuplicateObject`]
    ErrorOnDuplicate,
}

#[derive(Debug, Clone)]
struct TxnBackup {
    objects: HashMap<TypeName, BTreeMap<ObjectId, StoredObject>>,
    next_id: ObjectId,
}

/// The embedded object store.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    schemas: SchemaRegistry,
    objects: HashMap<TypeName, BTreeMap<ObjectId, StoredObject>>,
    next_id: ObjectId,
    txn: Option<TxnBackup>,
}

impl ObjectStore {
    /// Create a store over a fully registered schema registry.
    pub fn new(schemas: SchemaRegistry) -> Self {
        // Initialize empty collections for all registered types
        let mut objects = HashMap::new();
        for name in schemas.type_names() {
            objects.insert(name.clone(), BTreeMap::new());
        }

        Self {
            schemas,
            objects,
            next_id: 1,
            txn: None,
        }
    }

    /// The schema registry backing this store.
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Check whether a write transaction is in progress.
    pub fn in_write(&self) -> bool {
        self.txn.is_some()
    }

    /// Begin a write transaction.
    ///
    /// Only one transaction may be open at a time.
    pub fn begin_write(&mut self) -> Result<()> {
        if self.txn.is_some() {
            return Err(Error::WriteInProgress);
        }
        self.txn = Some(TxnBackup {
            objects: self.objects.clone(),
            next_id: self.next_id,
        });
        Ok(())
    }

    /// Commit the open write transaction.
    pub fn commit_write(&mut self) -> Result<()> {
        self.txn.take().map(|_| ()).ok_or(Error::NoWriteTransaction)
    }

    /// Abort the open write transaction, restoring pre-transaction state.
    pub fn rollback_write(&mut self) -> Result<()> {
        let backup = self.txn.take().ok_or(Error::NoWriteTransaction)?;
        self.objects = backup.objects;
        self.next_id = backup.next_id;
        Ok(())
    }

    /// Execute a creation record as an upsert.
    ///
    /// Nested records are upserted first (each under the policy implied by
    /// its own type's primary-key declaration) and replaced by links. For a
    /// type with a declared primary key, an existing object with an equal
    /// key value is merged into or rejected according to `policy`; types
    /// without a primary key always create a fresh object.
    ///
    /// Requires an open write transaction.
    pub fn upsert(
        &mut self,
        type_name: &str,
        record: CreationRecord,
        policy: UpdatePolicy,
    ) -> Result<ObjectId> {
        if self.txn.is_none() {
            return Err(Error::NoWriteTransaction);
        }
        self.upsert_record(type_name, record, policy)
    }

    fn upsert_record(
        &mut self,
        type_name: &str,
        record: CreationRecord,
        policy: UpdatePolicy,
    ) -> Result<ObjectId> {
        self.validate_record(type_name, &record)?;
        let pk_field = self.schemas.primary_key(type_name).map(|f| f.name.clone());

        // Resolve nested records to links, depth first.
        let mut fields = BTreeMap::new();
        for (name, field_value) in record {
            let value = match field_value {
                FieldValue::Scalar(value) => value,
                FieldValue::Object(nested) => {
                    let nested_type = nested.type_name().to_string();
                    let nested_policy = self.policy_for(&nested_type);
                    Value::Link(self.upsert_record(&nested_type, nested, nested_policy)?)
                }
                FieldValue::ObjectList(list) => {
                    let mut ids = Vec::with_capacity(list.len());
                    for nested in list {
                        let nested_type = nested.type_name().to_string();
                        let nested_policy = self.policy_for(&nested_type);
                        ids.push(self.upsert_record(&nested_type, nested, nested_policy)?);
                    }
                    Value::LinkList(ids)
                }
            };
            fields.insert(name, value);
        }

        if let Some(pk) = pk_field {
            let Some(key) = fields.get(&pk).cloned() else {
                return Err(Error::MissingPrimaryKey {
                    type_name: type_name.to_string(),
                    field: pk,
                });
            };

            if let Some(existing_id) = self.find_id_by_field(type_name, &pk, &key) {
                return match policy {
                    UpdatePolicy::MergeByKey => {
                        if let Some(existing) = self
                            .objects
                            .get_mut(type_name)
                            .and_then(|c| c.get_mut(&existing_id))
                        {
                            existing.fields.extend(fields);
                        }
                        Ok(existing_id)
                    }
                    UpdatePolicy::ErrorOnDuplicate => Err(Error::DuplicateObject {
                        type_name: type_name.to_string(),
                        key: key.to_string(),
                    }),
                };
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        let object = StoredObject {
            id,
            type_name: type_name.to_string(),
            fields,
        };
        self.objects
            .entry(type_name.to_string())
            .or_default()
            .insert(id, object);
        Ok(id)
    }

    fn policy_for(&self, type_name: &str) -> UpdatePolicy {
        if self.schemas.primary_key(type_name).is_some() {
            UpdatePolicy::MergeByKey
        } else {
            UpdatePolicy::ErrorOnDuplicate
        }
    }

    /// Validate a record against its type's descriptor table.
    fn validate_record(&self, type_name: &str, record: &CreationRecord) -> Result<()> {
        let schema = self.schemas.schema_for(type_name)?;
        let invalid = |reason: String| Error::InvalidRecord {
            type_name: type_name.to_string(),
            reason,
        };

        for (name, field_value) in record.iter() {
            let Some(field) = schema.field(name) else {
                return Err(invalid(format!("unknown field '{}'", name)));
            };

            match field_value {
                FieldValue::Scalar(value) => {
                    if matches!(value, Value::Link(_) | Value::LinkList(_)) {
                        return Err(invalid(format!(
                            "field '{}': links are assigned by the store",
                            name
                        )));
                    }
                    if field.kind == FieldKind::Object {
                        return Err(invalid(format!(
                            "field '{}' expects a nested record, got {}",
                            name,
                            value.kind_name()
                        )));
                    }
                    if !value_matches_kind(value, field.kind) {
                        return Err(invalid(format!(
                            "field '{}' expects {}, got {}",
                            name,
                            field.kind,
                            value.kind_name()
                        )));
                    }
                }
                FieldValue::Object(_) => {
                    if field.kind != FieldKind::Object || field.is_list {
                        return Err(invalid(format!(
                            "field '{}' does not hold a single nested object",
                            name
                        )));
                    }
                }
                FieldValue::ObjectList(_) => {
                    if field.kind != FieldKind::Object || !field.is_list {
                        return Err(invalid(format!(
                            "field '{}' does not hold a nested object list",
                            name
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Get an object by type and id.
    pub fn get(&self, type_name: &str, id: ObjectId) -> Option<&StoredObject> {
        self.objects.get(type_name)?.get(&id)
    }

    /// Get an object by id alone, whatever its type.
    ///
    /// Ids are unique across types, so at most one object matches. This is
    /// how link targets are resolved: a link may point at a subtype of the
    /// field's declared type.
    pub fn get_by_id(&self, id: ObjectId) -> Option<&StoredObject> {
        self.objects.values().find_map(|c| c.get(&id))
    }

    /// Find an object by its declared primary key value.
    pub fn find_by_key(&self, type_name: &str, key: &Value) -> Option<&StoredObject> {
        let pk = self.schemas.primary_key(type_name)?.name.clone();
        let id = self.find_id_by_field(type_name, &pk, key)?;
        self.get(type_name, id)
    }

    fn find_id_by_field(&self, type_name: &str, field: &str, value: &Value) -> Option<ObjectId> {
        self.objects
            .get(type_name)?
            .values()
            .find(|o| o.fields.get(field) == Some(value))
            .map(|o| o.id)
    }

    /// Iterate all objects of a type, in id order.
    pub fn objects(&self, type_name: &str) -> impl Iterator<Item = &StoredObject> {
        self.objects
            .get(type_name)
            .into_iter()
            .flat_map(|c| c.values())
    }

    /// Count of objects of a type.
    pub fn len(&self, type_name: &str) -> usize {
        self.objects.get(type_name).map_or(0, |c| c.len())
    }

    /// Check whether a type has no objects.
    pub fn is_empty(&self, type_name: &str) -> bool {
        self.len(type_name) == 0
    }

    /// Total object count across all types.
    pub fn total_len(&self) -> usize {
        self.objects.values().map(|c| c.len()).sum()
    }

    /// Export the current object state as a snapshot.
    pub fn export_state(&self) -> crate::snapshot::StoreSnapshot {
        let mut snapshot = crate::snapshot::StoreSnapshot::new(self.next_id);
        for collection in self.objects.values() {
            for object in collection.values() {
                snapshot.add_object(object.clone());
            }
        }
        snapshot
    }

    /// Import state from a snapshot, replacing the current objects.
    ///
    /// All snapshot types must be registered and no id may reach the
    /// snapshot's id watermark.
    pub fn import_state(&mut self, snapshot: crate::snapshot::StoreSnapshot) -> Result<()> {
        snapshot.validate(&self.schemas)?;

        for collection in self.objects.values_mut() {
            collection.clear();
        }
        for (type_name, objects) in snapshot.objects {
            self.objects.entry(type_name).or_default().extend(objects);
        }
        self.next_id = snapshot.next_id;

        Ok(())
    }
}

fn value_matches_kind(value: &Value, kind: FieldKind) -> bool {
    matches!(
        (value, kind),
        (Value::Bool(_), FieldKind::Bool)
            | (Value::Int(_), FieldKind::Int)
            | (Value::Float(_), FieldKind::Float)
            | (Value::Double(_), FieldKind::Double)
            | (Value::String(_), FieldKind::String)
            | (Value::Bytes(_), FieldKind::Bytes)
            | (Value::Date(_), FieldKind::Date)
            | (Value::Any(_), FieldKind::Any)
    )
}
