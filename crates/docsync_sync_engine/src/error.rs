//! Error types for the sync engine.

use docsync_codec::CodecError;
use docsync_core::CoreError;
use docsync_sync_protocol::ProtocolError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A local datastore operation failed.
    #[error("datastore error: {0}")]
    Core(#[from] CoreError),

    /// A document could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The remote side could not be reached or answered with a failure.
    #[error("transport error{}: {message}", status_suffix(.status))]
    Transport {
        /// HTTP status, or `None` if no response arrived.
        status: Option<u16>,
        /// Error message.
        message: String,
    },

    /// A message broke the sync protocol.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Not connected.
    #[error("not connected to server")]
    NotConnected,
}

impl SyncError {
    /// Creates a transport error for a request that got no response.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Creates a transport error for a non-success response.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Returns true if repeating the operation may succeed.
    ///
    /// Sync itself never retries; callers that want retries decide here.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { status: None, .. } => true,
            SyncError::Transport {
                status: Some(status),
                ..
            } => *status >= 500,
            SyncError::NotConnected => true,
            _ => false,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

impl From<ProtocolError> for SyncError {
    fn from(err: ProtocolError) -> Self {
        Self::Protocol(err.to_string())
    }
}
