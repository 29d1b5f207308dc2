//! Error types for the sync protocol.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while encoding, decoding or routing protocol messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The message body is not valid for its type.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// The path does not name a known route.
    #[error("unknown route: {0}")]
    UnknownRoute(String),

    /// The HTTP method is not one the protocol uses.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
