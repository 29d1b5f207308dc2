//! Datastore configuration.

/// Configuration for opening a datastore.
#[derive(Debug, Clone)]
pub struct DatastoreConfig {
    /// Datastore id announced to peers.
    ///
    /// `None` reuses the id the backend persisted, or generates a random one
    /// for a fresh backend.
    pub id: Option<String>,

    /// Whether file-backed stores create missing parent directories.
    pub create_dirs: bool,
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self {
            id: None,
            create_dirs: true,
        }
    }
}

impl DatastoreConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the datastore id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets whether missing parent directories are created.
    #[must_use]
    pub const fn create_dirs(mut self, value: bool) -> Self {
        self.create_dirs = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = DatastoreConfig::default();
        assert!(config.id.is_none());
        assert!(config.create_dirs);
    }

    #[test]
    fn builder_pattern() {
        let config = DatastoreConfig::new().id("store-a").create_dirs(false);
        assert_eq!(config.id.as_deref(), Some("store-a"));
        assert!(!config.create_dirs);
    }
}
