//! # docsync codec
//!
//! The document model shared by every docsync crate.
//!
//! A [`Document`] is a flat record of scalar [`Value`]s keyed by string.
//! Three keys are reserved for replication:
//!
//! - `_id`: the stable identifier, always a string
//! - `_rev`: the revision assigned by the store that holds the document
//! - `_deleted`: the tombstone flag
//!
//! Documents carry a deterministic total order ([`Document::compare`]) that
//! replicas use to break ties between two versions with the same revision,
//! and a JSON wire form (see [`json`]).
//!
//! ## Usage
//!
//! ```
//! use docsync_codec::{json, Document};
//!
//! let doc = Document::new("A").with("value", "v1").unwrap();
//! let text = json::to_json(&doc).unwrap();
//! assert_eq!(text, r#"{"_id":"A","value":"v1"}"#);
//! assert_eq!(json::from_json(&text).unwrap(), doc);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod document;
mod error;
pub mod json;
mod value;

pub use document::{is_reserved, Document, DELETED_FIELD, ID_FIELD, REV_FIELD};
pub use error::{CodecError, CodecResult, ComparisonError};
pub use value::{Value, ValueKind};
