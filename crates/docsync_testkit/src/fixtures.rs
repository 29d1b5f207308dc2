//! Test fixtures and datastore helpers.
//!
//! Provides convenience functions for setting up test datastores
//! and building documents.

use docsync_codec::{Document, Value};
use docsync_core::{Datastore, DatastoreConfig};
use docsync_storage::TableSchema;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File name of the journal inside a [`TestStore::file`] directory.
pub const JOURNAL_NAME: &str = "store.journal";

/// The field [`doc`] writes, and the extra column of [`TestStore::table`].
pub const VALUE_COLUMN: &str = "value";

/// A test datastore with automatic cleanup.
pub struct TestStore {
    /// The datastore instance.
    pub store: Datastore,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates an in-memory datastore with the given id.
    pub fn memory(id: &str) -> Self {
        Self {
            store: Datastore::open_in_memory_with_config(DatastoreConfig::new().id(id))
                .expect("Failed to open in-memory datastore"),
            temp_dir: None,
        }
    }

    /// Creates a journal-backed datastore in a fresh temporary directory.
    pub fn file(id: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(JOURNAL_NAME);
        let store = Datastore::open_file(&path, DatastoreConfig::new().id(id))
            .expect("Failed to open file datastore");
        Self {
            store,
            temp_dir: Some(temp_dir),
        }
    }

    /// Creates a table-backed datastore whose rows hold one `value` column.
    pub fn table(id: &str) -> Self {
        let schema = TableSchema::synced(id).with_column(VALUE_COLUMN);
        Self {
            store: Datastore::open_table(schema, DatastoreConfig::new().id(id))
                .expect("Failed to open table datastore"),
            temp_dir: None,
        }
    }

    /// Returns the journal path if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self.temp_dir.as_ref().map(|d| d.path().join(JOURNAL_NAME))
    }

    /// Closes and reopens a file-based store from its journal.
    ///
    /// # Panics
    ///
    /// Panics for an in-memory store, which has nothing to reopen.
    pub fn reopen(self) -> Self {
        let temp_dir = self.temp_dir.expect("Only file datastores can be reopened");
        drop(self.store);
        let path = temp_dir.path().join(JOURNAL_NAME);
        let store = Datastore::open_file(&path, DatastoreConfig::new())
            .expect("Failed to reopen file datastore");
        Self {
            store,
            temp_dir: Some(temp_dir),
        }
    }
}

impl std::ops::Deref for TestStore {
    type Target = Datastore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with a temporary in-memory datastore.
///
/// # Example
///
/// ```rust
/// use docsync_testkit::{doc, with_temp_store};
///
/// with_temp_store(|store| {
///     assert!(store.put_if_needed(&doc("A", "v1")).unwrap());
/// });
/// ```
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&Datastore) -> R,
{
    let test_store = TestStore::memory("test");
    f(&test_store.store)
}

/// Runs a test with a temporary journal-backed datastore.
pub fn with_file_store<F, R>(f: F) -> R
where
    F: FnOnce(&Datastore, &Path) -> R,
{
    let test_store = TestStore::file("test");
    let path = test_store.path().expect("File datastore should have a path");
    f(&test_store.store, &path)
}

/// A document with one `value` field and no revision.
pub fn doc(id: &str, value: impl Into<Value>) -> Document {
    Document::new(id)
        .with(VALUE_COLUMN, value)
        .expect("value is not a reserved field")
}

/// A document with one `value` field and the given revision.
pub fn doc_with_rev(id: &str, rev: u64, value: impl Into<Value>) -> Document {
    let mut d = doc(id, value);
    d.set_rev(rev).expect("Revision out of range");
    d
}

/// Stores `count` documents named `{prefix}{i}` with no revision.
pub fn seed(store: &Datastore, prefix: &str, count: usize) {
    for i in 0..count {
        store
            .put_if_needed(&doc(&format!("{prefix}{i}"), i as i64))
            .expect("Failed to seed document");
    }
}
