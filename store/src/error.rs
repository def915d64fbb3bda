//! Error types for the Strata object store.

use crate::{FieldName, TypeName};
use thiserror::Error;

/// All possible errors from the object store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Schema errors
    #[error("unknown type: {0}")]
    UnknownType(TypeName),

    #[error("invalid schema for '{type_name}': {reason}")]
    InvalidSchema { type_name: TypeName, reason: String },

    // Write errors
    #[error("invalid record for '{type_name}': {reason}")]
    InvalidRecord { type_name: TypeName, reason: String },

    #[error("duplicate object of type '{type_name}' for key {key}")]
    DuplicateObject { type_name: TypeName, key: String },

    #[error("missing primary key '{field}' for type '{type_name}'")]
    MissingPrimaryKey { type_name: TypeName, field: FieldName },

    // Transaction errors
    #[error("no write transaction in progress")]
    NoWriteTransaction,

    #[error("a write transaction is already in progress")]
    WriteInProgress,

    // State errors
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::UnknownType("muppet".into());
        assert_eq!(err.to_string(), "unknown type: muppet");

        let err = Error::DuplicateObject {
            type_name: "user".into(),
            key: "\"user-1\"".into(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate object of type 'user' for key \"user-1\""
        );

        let err = Error::MissingPrimaryKey {
            type_name: "user".into(),
            field: "obj_id".into(),
        };
        assert_eq!(
            err.to_string(),
            "missing primary key 'obj_id' for type 'user'"
        );
    }
}
