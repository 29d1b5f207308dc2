//! Datastore statistics.
//!
//! Counters are atomic and can be read while operations are in progress.
//!
//! ```rust
//! use docsync_codec::Document;
//! use docsync_core::Datastore;
//!
//! let store = Datastore::open_in_memory().unwrap();
//! store.put_if_needed(&Document::new("A")).unwrap();
//! store.put_if_needed(&Document::new("A")).unwrap();
//!
//! let stats = store.stats().snapshot();
//! assert_eq!(stats.writes, 1);
//! assert_eq!(stats.ignored_puts, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Operation counters for one datastore.
#[derive(Debug, Default)]
pub struct DatastoreStats {
    /// Document lookups.
    reads: AtomicU64,
    /// Documents written, tombstones included.
    writes: AtomicU64,
    /// Puts that lost to the stored version.
    ignored_puts: AtomicU64,
    /// Tombstones written by `delete`.
    deletes: AtomicU64,
    /// Pages served by `get_docs_since`.
    pages_served: AtomicU64,
    /// Documents handed out in those pages.
    documents_served: AtomicU64,
    /// Operations that returned an error.
    errors: AtomicU64,
}

impl DatastoreStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_ignored_put(&self) {
        self.ignored_puts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_page(&self, documents: usize) {
        self.pages_served.fetch_add(1, Ordering::Relaxed);
        self.documents_served
            .fetch_add(documents as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of document lookups.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Returns the number of documents written.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Returns the number of puts that changed nothing.
    pub fn ignored_puts(&self) -> u64 {
        self.ignored_puts.load(Ordering::Relaxed)
    }

    /// Returns the number of tombstones written by `delete`.
    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    /// Returns the number of pages served.
    pub fn pages_served(&self) -> u64 {
        self.pages_served.load(Ordering::Relaxed)
    }

    /// Returns the number of documents served in pages.
    pub fn documents_served(&self) -> u64 {
        self.documents_served.load(Ordering::Relaxed)
    }

    /// Returns the number of failed operations.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            reads: self.reads(),
            writes: self.writes(),
            ignored_puts: self.ignored_puts(),
            deletes: self.deletes(),
            pages_served: self.pages_served(),
            documents_served: self.documents_served(),
            errors: self.errors(),
        }
    }
}

/// A point-in-time copy of [`DatastoreStats`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Document lookups.
    pub reads: u64,
    /// Documents written.
    pub writes: u64,
    /// Puts that changed nothing.
    pub ignored_puts: u64,
    /// Tombstones written by `delete`.
    pub deletes: u64,
    /// Pages served.
    pub pages_served: u64,
    /// Documents served in pages.
    pub documents_served: u64,
    /// Failed operations.
    pub errors: u64,
}
