//! The datastore capability surface replication runs against.

use crate::error::SyncResult;
use docsync_codec::Document;
use docsync_core::{Datastore, DocsSince};
use std::sync::Arc;

/// Anything that can act as one side of a sync.
///
/// Implemented by the local [`Datastore`] and by
/// [`crate::RemoteDatastore`], so the replicator can pull between any pair.
/// Every call may fail: a local store surfaces storage errors, a remote one
/// transport errors.
pub trait DocumentStore {
    /// Datastore id announced to peers.
    fn id(&self) -> &str;

    /// Reads a document, tombstones included.
    fn get(&self, id: &str) -> SyncResult<Option<Document>>;

    /// Stores `doc` if it beats the stored version. Returns true if written.
    fn put_if_needed(&self, doc: &Document) -> SyncResult<bool>;

    /// Writes a tombstone. Returns true if one was written.
    fn delete(&self, id: &str) -> SyncResult<bool>;

    /// Up to `limit` documents with `_rev > since`, oldest first.
    fn get_docs_since(&self, since: u64, limit: usize) -> SyncResult<DocsSince>;

    /// Last sequence number consumed from `peer`, or 0.
    fn peer_sequence_id(&self, peer: &str) -> SyncResult<u64>;

    /// Advances the cursor for `peer`.
    fn set_peer_sequence_id(&self, peer: &str, sequence_id: u64) -> SyncResult<()>;
}

impl DocumentStore for Datastore {
    fn id(&self) -> &str {
        Datastore::id(self)
    }

    fn get(&self, id: &str) -> SyncResult<Option<Document>> {
        Ok(Datastore::get(self, id)?)
    }

    fn put_if_needed(&self, doc: &Document) -> SyncResult<bool> {
        Ok(Datastore::put_if_needed(self, doc)?)
    }

    fn delete(&self, id: &str) -> SyncResult<bool> {
        Ok(Datastore::delete(self, id)?)
    }

    fn get_docs_since(&self, since: u64, limit: usize) -> SyncResult<DocsSince> {
        Ok(Datastore::get_docs_since(self, since, limit)?)
    }

    fn peer_sequence_id(&self, peer: &str) -> SyncResult<u64> {
        Ok(Datastore::peer_sequence_id(self, peer))
    }

    fn set_peer_sequence_id(&self, peer: &str, sequence_id: u64) -> SyncResult<()> {
        Ok(Datastore::set_peer_sequence_id(self, peer, sequence_id)?)
    }
}

impl<T: DocumentStore + ?Sized> DocumentStore for &T {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn get(&self, id: &str) -> SyncResult<Option<Document>> {
        (**self).get(id)
    }

    fn put_if_needed(&self, doc: &Document) -> SyncResult<bool> {
        (**self).put_if_needed(doc)
    }

    fn delete(&self, id: &str) -> SyncResult<bool> {
        (**self).delete(id)
    }

    fn get_docs_since(&self, since: u64, limit: usize) -> SyncResult<DocsSince> {
        (**self).get_docs_since(since, limit)
    }

    fn peer_sequence_id(&self, peer: &str) -> SyncResult<u64> {
        (**self).peer_sequence_id(peer)
    }

    fn set_peer_sequence_id(&self, peer: &str, sequence_id: u64) -> SyncResult<()> {
        (**self).set_peer_sequence_id(peer, sequence_id)
    }
}

impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn get(&self, id: &str) -> SyncResult<Option<Document>> {
        (**self).get(id)
    }

    fn put_if_needed(&self, doc: &Document) -> SyncResult<bool> {
        (**self).put_if_needed(doc)
    }

    fn delete(&self, id: &str) -> SyncResult<bool> {
        (**self).delete(id)
    }

    fn get_docs_since(&self, since: u64, limit: usize) -> SyncResult<DocsSince> {
        (**self).get_docs_since(since, limit)
    }

    fn peer_sequence_id(&self, peer: &str) -> SyncResult<u64> {
        (**self).peer_sequence_id(peer)
    }

    fn set_peer_sequence_id(&self, peer: &str, sequence_id: u64) -> SyncResult<()> {
        (**self).set_peer_sequence_id(peer, sequence_id)
    }
}
