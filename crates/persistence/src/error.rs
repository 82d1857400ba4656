use thiserror::Error;

use crate::Version;

/// Errors surfaced by a storage collaborator.
///
/// Commit failures leave every staged mutation un-applied; nothing here is
/// retried automatically.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The row changed between being read and being written back.
    #[error(
        "Concurrency conflict for {entity_type} {id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        entity_type: &'static str,
        id: String,
        expected: Version,
        actual: Version,
    },

    /// An entity with the same primary key already exists.
    #[error("Duplicate key for {entity_type}: {id}")]
    DuplicateKey { entity_type: &'static str, id: String },

    /// A unique index would be violated by the commit.
    #[error("Unique index {index} on {entity_type} violated by value {value}")]
    ConstraintViolation {
        entity_type: &'static str,
        index: &'static str,
        value: String,
    },

    /// The row being updated or removed no longer exists.
    #[error("{entity_type} {id} no longer exists")]
    Missing { entity_type: &'static str, id: String },

    /// The backing storage rejected the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A row could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
