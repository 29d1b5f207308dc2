//! # docsync sync server
//!
//! Request handling for hosted docsync datastores.
//!
//! This crate provides:
//! - A registry of named datastores, in memory or journal-backed
//! - Handlers for every remote datastore route
//! - Mapping of failures to HTTP status codes and JSON error bodies
//!
//! # Architecture
//!
//! The server is transport-agnostic. [`SyncServer::handle`] takes a method,
//! a path and a body and returns a status and a body, so any HTTP framework
//! (or an in-process loopback) can sit in front of it. Datastores use the
//! same `docsync_core` engine as clients.
//!
//! # Routes
//!
//! See [`docsync_sync_protocol::Route`]. `POST /{store}` creates a
//! datastore when `autocreate` is on, and `POST /{store}/doc?increment_rev=true`
//! stores the body as a local edit with a fresh revision.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{HandlerContext, RequestHandler, JOURNAL_EXTENSION};
pub use server::{ServerResponse, SyncServer};
