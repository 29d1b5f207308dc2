//! Storage backend trait definition.

use crate::error::StorageResult;
use docsync_codec::Document;
use std::collections::BTreeMap;

/// Counter state a backend restores when a datastore opens it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    /// Datastore id persisted by an earlier session, if any.
    pub store_id: Option<String>,
    /// Highest sequence number handed out or adopted so far.
    pub sequence_id: u64,
    /// Last sequence number consumed from each peer.
    pub peers: BTreeMap<String, u64>,
}

/// A raw document store underneath a datastore.
///
/// Backends only store and retrieve. They never assign revisions or resolve
/// conflicts; the datastore engine does that and hands finished documents
/// down together with the counter value that goes with them.
///
/// # Invariants
///
/// - `raw_put` persists the document and the sequence id as one unit: after
///   an error neither is visible, after success both are
/// - `docs_since` returns documents ordered by ascending `_rev`
/// - `load_state` reflects every successful `raw_put`, `save_peer_sequence`
///   and `save_store_id`
/// - Backends must be `Send + Sync` so a datastore can be shared
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - ephemeral stores and tests
/// - [`super::FileBackend`] - durable JSON-lines journal
/// - [`super::TableBackend`] - column-mapped rows with a revisions table
pub trait StorageBackend: Send + Sync {
    /// Restores counter state, store id and peer cursors.
    fn load_state(&self) -> StorageResult<StoreState>;

    /// Reads the stored document with the given id, tombstones included.
    fn raw_get(&self, id: &str) -> StorageResult<Option<Document>>;

    /// Writes a document (insert or replace) and records `sequence_id` as the
    /// store's counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no `_rev` or cannot be stored.
    fn raw_put(&mut self, doc: &Document, sequence_id: u64) -> StorageResult<()>;

    /// Returns documents with `_rev > since` in ascending `_rev` order.
    ///
    /// At most `limit` documents are returned, except that a page never ends
    /// in the middle of a revision: documents sharing the last revision of
    /// the page are all included, so a cursor set to that revision skips
    /// nothing.
    fn docs_since(&self, since: u64, limit: usize) -> StorageResult<Vec<Document>>;

    /// Records the last sequence number consumed from `peer`.
    fn save_peer_sequence(&mut self, peer: &str, sequence_id: u64) -> StorageResult<()>;

    /// Records the datastore id this backend belongs to.
    fn save_store_id(&mut self, store_id: &str) -> StorageResult<()>;

    /// Ids of every stored document, tombstones included, in sorted order.
    fn ids(&self) -> StorageResult<Vec<String>>;

    /// Number of stored documents, tombstones included.
    fn len(&self) -> StorageResult<usize> {
        Ok(self.ids()?.len())
    }

    /// Returns true if nothing has been stored.
    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}
