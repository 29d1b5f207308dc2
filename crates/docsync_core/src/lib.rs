//! # docsync core
//!
//! The datastore engine.
//!
//! A [`Datastore`] wraps a storage backend with everything replication
//! needs:
//!
//! - Sequence numbers: every local write takes the next value of a
//!   monotonic counter, stamped into the document as `_rev`
//! - Conflict resolution: [`Datastore::put_if_needed`] keeps the higher
//!   revision and breaks ties with the document comparator
//! - Change feed: [`Datastore::get_docs_since`] pages through documents
//!   newer than a cursor
//! - Peer cursors: how far this store has pulled from each peer
//!
//! ## Example
//!
//! ```rust
//! use docsync_codec::Document;
//! use docsync_core::Datastore;
//!
//! let store = Datastore::open_in_memory().unwrap();
//! let doc = Document::new("A").with("value", "v1").unwrap();
//!
//! assert!(store.put_if_needed(&doc).unwrap());
//! assert_eq!(store.get("A").unwrap().unwrap().rev(), Some(1));
//!
//! // The same content again changes nothing.
//! assert!(!store.put_if_needed(&doc).unwrap());
//! assert_eq!(store.sequence_id(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod check;
mod config;
mod datastore;
mod error;
mod id;
mod stats;

pub use check::{CheckIssue, CheckReport};
pub use config::DatastoreConfig;
pub use datastore::{Datastore, DocsSince};
pub use error::{CoreError, CoreResult};
pub use id::new_store_id;
pub use stats::{DatastoreStats, StatsSnapshot};

/// Crate version, as published.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
