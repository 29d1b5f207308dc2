//! Error types for the sync server.

use docsync_core::CoreError;
use docsync_sync_protocol::{ErrorCode, ProtocolError};
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the sync server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// No datastore is hosted under this name.
    #[error("unknown datastore: {0}")]
    UnknownDatastore(String),

    /// The path does not name a route.
    #[error("unknown route: {0}")]
    UnknownRoute(String),

    /// The datastore holds no document with this id.
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    /// The route exists but not for this method.
    #[error("method {method} not allowed on {path}")]
    MethodNotAllowed {
        /// Request method.
        method: String,
        /// Request path.
        path: String,
    },

    /// The datastore name cannot be hosted.
    #[error("invalid datastore name: {0}")]
    InvalidName(String),

    /// Invalid request format.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request was well formed but the datastore refused it.
    #[error("unprocessable: {0}")]
    Unprocessable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::UnknownDatastore(_)
            | ServerError::UnknownRoute(_)
            | ServerError::DocumentNotFound(_) => 404,
            ServerError::MethodNotAllowed { .. } => 405,
            ServerError::InvalidName(_) | ServerError::InvalidRequest(_) => 400,
            ServerError::Unprocessable(_) => 422,
            ServerError::Internal(_) => 500,
        }
    }

    /// Wire code for this error, sent alongside the message.
    pub fn code(&self) -> ErrorCode {
        match self {
            ServerError::UnknownDatastore(_) => ErrorCode::UnknownDatastore,
            ServerError::UnknownRoute(_) => ErrorCode::UnknownRoute,
            ServerError::DocumentNotFound(_) => ErrorCode::DocumentNotFound,
            ServerError::MethodNotAllowed { .. } => ErrorCode::MethodNotAllowed,
            ServerError::InvalidName(_) => ErrorCode::InvalidName,
            ServerError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            ServerError::Unprocessable(_) => ErrorCode::Unprocessable,
            ServerError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl From<CoreError> for ServerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Comparison(_)
            | CoreError::Codec(_)
            | CoreError::MissingId
            | CoreError::InvalidRevision { .. } => Self::Unprocessable(err.to_string()),
            CoreError::Storage(_) | CoreError::StoreIdMismatch { .. } => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<ProtocolError> for ServerError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Malformed(message) => Self::InvalidRequest(message),
            ProtocolError::UnknownRoute(path) => Self::UnknownRoute(path),
            ProtocolError::UnsupportedMethod(method) => Self::MethodNotAllowed {
                method,
                path: String::new(),
            },
        }
    }
}
