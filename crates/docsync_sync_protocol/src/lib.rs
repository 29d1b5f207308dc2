//! # docsync sync protocol
//!
//! Wire messages and routes for replicating with a remote datastore.
//!
//! This crate provides:
//! - JSON message bodies ([`DocsSinceRequest`], [`DocsSinceResponse`],
//!   [`PutResponse`], [`PeerSequenceResponse`] and friends)
//! - The [`Route`] table shared by the HTTP client and the server
//!
//! Documents travel in their flat JSON form (see `docsync_codec::json`).
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod messages;
mod routes;

pub use error::{ProtocolError, ProtocolResult};
pub use messages::{
    decode, encode, DatastoreInfo, DatastoreList, DocsSinceRequest, DocsSinceResponse, ErrorBody,
    ErrorCode, PeerSequenceResponse, PutResponse,
};
pub use routes::{decode_segment, encode_segment, Method, Route};
