//! # docsync testkit
//!
//! Test utilities for docsync.
//!
//! This crate provides:
//! - Datastore fixtures (in-memory and journal-backed) and document helpers
//! - Property-based test generators using proptest
//! - Loopback hosting of a sync server for remote-store tests
//! - Convergence assertions
//! - Concurrency stress helpers
//! - Shared comparator and wire-format vectors
//!
//! ## Usage
//!
//! ```rust
//! use docsync_testkit::prelude::*;
//!
//! let a = TestStore::memory("a");
//! let b = TestStore::memory("b");
//! a.put_if_needed(&doc("A", "v1")).unwrap();
//! docsync_sync_engine::sync(&*a, &*b).unwrap();
//! assert_converged(&*a, &*b);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;
pub mod stress;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
pub use stress::*;
pub use vectors::*;
