//! # docsync storage
//!
//! Storage backend trait and implementations for docsync.
//!
//! A backend is the raw document store underneath a datastore: it reads and
//! writes whole documents and persists the datastore's counters, but never
//! decides which version of a document wins. That logic lives in
//! `docsync_core`.
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral stores
//! - [`FileBackend`] - Durable append-only JSON-lines journal
//! - [`TableBackend`] - Column-mapped rows with a side revisions table
//!
//! ## Example
//!
//! ```rust
//! use docsync_codec::Document;
//! use docsync_storage::{StorageBackend, TableBackend, TableSchema};
//!
//! let schema = TableSchema::synced("notes").with_column("title");
//! let mut table = TableBackend::new(schema).unwrap();
//!
//! let mut doc = Document::new("n1").with("title", "hello").unwrap();
//! doc.set_rev(1).unwrap();
//! table.raw_put(&doc, 1).unwrap();
//! assert_eq!(table.docs_since(0, 10).unwrap(), vec![doc]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod index;
mod memory;
mod table;

pub use backend::{StorageBackend, StoreState};
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
pub use table::{TableBackend, TableSchema};
