//! # docsync sync engine
//!
//! Replication between docsync datastores.
//!
//! This crate provides:
//! - The [`DocumentStore`] surface shared by local and remote datastores
//! - One-way [`pull`] and two-way [`sync`] driven by a [`Replicator`]
//! - [`RemoteDatastore`], a client for datastores hosted by the sync server
//! - HTTP client abstraction with a loopback implementation for tests
//!
//! ## Algorithm
//!
//! A pull from `source` into `target`:
//! 1. Reads `target`'s cursor for `source`
//! 2. Requests pages of documents with `_rev` above the cursor
//! 3. Offers each document to `target.put_if_needed`
//! 4. On the first empty page, advances the cursor to the source's
//!    sequence id
//!
//! A sync is a pull each way.
//!
//! ## Key Invariants
//!
//! - The cursor only moves after a pull completes
//! - Repeating a pull is harmless
//! - Two stores converge after a sync with no concurrent writes

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod http;
mod remote;
mod replicator;
mod store;

pub use config::{SyncConfig, DEFAULT_PAGE_SIZE};
pub use error::{SyncError, SyncResult};
pub use http::{HttpClient, HttpResponse, LoopbackClient, LoopbackServer};
pub use remote::RemoteDatastore;
pub use replicator::{pull, sync, PullStats, Replicator, SyncStats};
pub use store::DocumentStore;
