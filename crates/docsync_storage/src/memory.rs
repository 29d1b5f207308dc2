//! In-memory storage backend for testing and ephemeral stores.

use crate::backend::{StorageBackend, StoreState};
use crate::error::StorageResult;
use crate::index::DocumentIndex;
use docsync_codec::Document;

/// An in-memory storage backend.
///
/// Documents and counters live in process memory and vanish on drop.
///
/// # Example
///
/// ```rust
/// use docsync_codec::Document;
/// use docsync_storage::{InMemoryBackend, StorageBackend};
///
/// let mut backend = InMemoryBackend::new();
/// let mut doc = Document::new("A");
/// doc.set_rev(1).unwrap();
/// backend.raw_put(&doc, 1).unwrap();
/// assert_eq!(backend.raw_get("A").unwrap(), Some(doc));
/// assert_eq!(backend.load_state().unwrap().sequence_id, 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    docs: DocumentIndex,
    state: StoreState,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for InMemoryBackend {
    fn load_state(&self) -> StorageResult<StoreState> {
        Ok(self.state.clone())
    }

    fn raw_get(&self, id: &str) -> StorageResult<Option<Document>> {
        Ok(self.docs.get(id).cloned())
    }

    fn raw_put(&mut self, doc: &Document, sequence_id: u64) -> StorageResult<()> {
        self.docs.insert(doc.clone())?;
        self.state.sequence_id = sequence_id;
        Ok(())
    }

    fn docs_since(&self, since: u64, limit: usize) -> StorageResult<Vec<Document>> {
        Ok(self.docs.since(since, limit))
    }

    fn save_peer_sequence(&mut self, peer: &str, sequence_id: u64) -> StorageResult<()> {
        self.state.peers.insert(peer.to_string(), sequence_id);
        Ok(())
    }

    fn save_store_id(&mut self, store_id: &str) -> StorageResult<()> {
        self.state.store_id = Some(store_id.to_string());
        Ok(())
    }

    fn ids(&self) -> StorageResult<Vec<String>> {
        Ok(self.docs.ids())
    }

    fn len(&self) -> StorageResult<usize> {
        Ok(self.docs.len())
    }
}
