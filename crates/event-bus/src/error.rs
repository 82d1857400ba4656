use persistence::StorageError;
use thiserror::Error;

/// Errors raised by an event handler.
///
/// A handler error aborts the dispatch and propagates to whoever raised the
/// event.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler could not stage its write.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The event could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The handler rejected the event.
    #[error("Handler '{handler}' failed: {reason}")]
    Failed {
        handler: &'static str,
        reason: String,
    },
}
