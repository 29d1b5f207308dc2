//! Error types for storage operations.

use docsync_codec::CodecError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stored data is unreadable or breaks a storage invariant.
    #[error("storage corrupted: {0}")]
    Corrupted(String),

    /// Another process holds the journal lock.
    #[error("journal is locked by another process: {}", .0.display())]
    Locked(PathBuf),

    /// A document could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The table layout does not fit the document model.
    #[error("schema error in table `{table}`: column `{column}`")]
    Schema {
        /// Name of the table.
        table: String,
        /// The missing or unknown column.
        column: String,
    },
}

impl StorageError {
    /// Create a corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted(message.into())
    }

    /// Create a schema error.
    pub fn schema(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            column: column.into(),
        }
    }
}
