//! Error types for the catalog store abstraction.

use thiserror::Error;

/// Errors that can occur against a `CatalogStore` implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The write would violate a uniqueness or referential constraint.
    #[error("{entity} conflict: {detail}")]
    Conflict { entity: String, detail: String },

    /// A property key outside an entity's allow-list was requested.
    #[error("unknown property {property:?} for {entity}")]
    UnknownProperty { entity: String, property: String },

    /// Backend I/O error (connection, transaction, query execution).
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type for catalog store operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
