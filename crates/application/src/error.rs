//! Application error types.

use domain::ValidationError;
use event_bus::HandlerError;
use persistence::StorageError;
use thiserror::Error;

/// Errors returned by application services.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The request broke a domain rule.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Storage rejected a read or the commit.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// An event handler failed while the operation was running.
    #[error("Event handler error: {0}")]
    Handler(#[from] HandlerError),
}

impl ApplicationError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ApplicationError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Result type for application services.
pub type Result<T> = std::result::Result<T, ApplicationError>;
