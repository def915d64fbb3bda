//! Error types for the Strata coder.

use strata_store::{FieldName, TypeName};
use thiserror::Error;

/// All possible errors from decoding and encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown type: {0}")]
    UnknownType(TypeName),

    #[error("top-level JSON value is not an object")]
    NonObjectTopLevel,

    #[error("top-level JSON value is not an array")]
    NonArrayTopLevel,

    #[error("envelope '{envelope}' not found for type '{type_name}'")]
    EnvelopeNotFound {
        type_name: TypeName,
        envelope: String,
    },

    #[error("primary key '{field}' missing from payload for type '{type_name}'")]
    PrimaryKeyMissing {
        type_name: TypeName,
        field: FieldName,
    },

    #[error("no recognized keys found for type '{0}'")]
    EmptyRecord(TypeName),

    /// Raised only in strict conversion mode; tolerant mode skips the field.
    #[error("type mismatch for field '{field}': expected {expected}, got {got}")]
    TypeMismatch {
        field: FieldName,
        expected: String,
        got: String,
    },

    #[error("cyclic reference while encoding type '{0}'")]
    CyclicReference(TypeName),

    #[error("malformed json: {0}")]
    Parse(String),

    #[error(transparent)]
    Store(#[from] strata_store::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

/// Result type for coder operations.
pub type Result<T> = std::result::Result<T, Error>;
