//! Error types for docsync core.

use docsync_codec::{CodecError, ComparisonError};
use docsync_storage::StorageError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in datastore operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Two versions of a document could not be ordered.
    #[error("comparison error: {0}")]
    Comparison(#[from] ComparisonError),

    /// Document codec error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The document has an empty `_id`.
    #[error("document has an empty _id")]
    MissingId,

    /// A revision cannot be assigned or accepted.
    #[error("invalid revision for document `{id}`: {reason}")]
    InvalidRevision {
        /// The document id.
        id: String,
        /// Why the revision was refused.
        reason: String,
    },

    /// The configured datastore id differs from the one the backend holds.
    #[error("datastore id mismatch: configured `{configured}`, stored `{persisted}`")]
    StoreIdMismatch {
        /// Id passed in the configuration.
        configured: String,
        /// Id persisted by the backend.
        persisted: String,
    },
}

impl CoreError {
    /// Create an invalid revision error.
    pub fn invalid_revision(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRevision {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
