//! Server configuration.

use std::path::PathBuf;

/// Configuration for the sync server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Largest page served by `POST /{store}/docs`, whatever the client asks.
    pub max_chunk_size: usize,
    /// Whether `POST /{store}` may create a datastore.
    pub autocreate: bool,
    /// Directory holding one journal per datastore. In-memory if `None`.
    pub data_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum page size. Zero is raised to 1.
    pub fn with_max_chunk_size(mut self, size: usize) -> Self {
        self.max_chunk_size = size.max(1);
        self
    }

    /// Enables or disables datastore creation.
    pub fn with_autocreate(mut self, autocreate: bool) -> Self {
        self.autocreate = autocreate;
        self
    }

    /// Persists datastores as journals under `dir`.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 100,
            autocreate: true,
            data_dir: None,
        }
    }
}
