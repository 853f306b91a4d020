//! Error types for fleetcode-suggest
//!
//! Store failures propagate unchanged. Escalation failures never reach this
//! type: they are logged and recorded on the result tier instead.

use thiserror::Error;
use uuid::Uuid;

/// Suggestion engine error type
#[derive(Debug, Error)]
pub enum SuggestError {
    /// Referenced catalog item does not exist
    #[error("Catalog item not found: {0}")]
    ItemNotFound(Uuid),

    /// Caller supplied something the engine cannot act on
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    /// Store read/write failure
    #[error(transparent)]
    Store(#[from] fleetcode_common::Error),
}

impl From<sqlx::Error> for SuggestError {
    fn from(err: sqlx::Error) -> Self {
        SuggestError::Store(err.into())
    }
}

/// Result type for engine operations
pub type SuggestResult<T> = Result<T, SuggestError>;
