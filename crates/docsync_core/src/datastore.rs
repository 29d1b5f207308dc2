//! The datastore engine.

use crate::check::{CheckIssue, CheckReport};
use crate::config::DatastoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::id::new_store_id;
use crate::stats::DatastoreStats;
use docsync_codec::Document;
use docsync_storage::{
    FileBackend, InMemoryBackend, StorageBackend, StorageError, TableBackend, TableSchema,
};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// One page of changes returned by [`Datastore::get_docs_since`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocsSince {
    /// The store's sequence id when the page was read.
    pub current_sequence_id: u64,
    /// Documents in ascending `_rev` order.
    pub documents: Vec<Document>,
}

struct Inner {
    backend: Box<dyn StorageBackend>,
    sequence_id: u64,
    peers: BTreeMap<String, u64>,
}

/// A replicating document store.
///
/// The datastore owns a monotonically increasing sequence id and decides,
/// for every incoming document, whether it replaces the stored version.
/// The rule is the same everywhere, which is what lets replicas converge
/// without coordination:
///
/// - a higher `_rev` wins
/// - on equal `_rev` the document that sorts higher under
///   [`Document::compare`] wins
/// - a document without `_rev` only lands if the id is new, and is stamped
///   with the next sequence number
///
/// All operations take `&self`. Writes hold the write lock across the whole
/// read, decide and write sequence; reads share the read lock.
pub struct Datastore {
    id: String,
    inner: RwLock<Inner>,
    stats: DatastoreStats,
}

impl fmt::Debug for Datastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datastore")
            .field("id", &self.id)
            .field("sequence_id", &self.sequence_id())
            .finish_non_exhaustive()
    }
}

impl Datastore {
    /// Opens a datastore over an arbitrary backend.
    ///
    /// Restores the sequence id and peer cursors from the backend and settles
    /// the datastore id: the configured id, else the persisted one, else a
    /// fresh random id. The id is written back so durable backends keep it.
    ///
    /// # Errors
    ///
    /// Returns `StoreIdMismatch` if the configured id differs from a
    /// persisted one, or any storage error raised while loading.
    pub fn open(
        mut backend: Box<dyn StorageBackend>,
        config: DatastoreConfig,
    ) -> CoreResult<Self> {
        let state = backend.load_state()?;

        let id = match (config.id, state.store_id.clone()) {
            (Some(configured), Some(persisted)) if configured != persisted => {
                return Err(CoreError::StoreIdMismatch {
                    configured,
                    persisted,
                })
            }
            (Some(id), _) | (None, Some(id)) => id,
            (None, None) => new_store_id(),
        };
        if state.store_id.as_deref() != Some(id.as_str()) {
            backend.save_store_id(&id)?;
        }

        debug!(
            store = %id,
            sequence_id = state.sequence_id,
            peers = state.peers.len(),
            "datastore opened"
        );

        Ok(Self {
            id,
            inner: RwLock::new(Inner {
                backend,
                sequence_id: state.sequence_id,
                peers: state.peers,
            }),
            stats: DatastoreStats::new(),
        })
    }

    /// Opens an empty in-memory datastore with a random id.
    pub fn open_in_memory() -> CoreResult<Self> {
        Self::open(Box::new(InMemoryBackend::new()), DatastoreConfig::default())
    }

    /// Opens an empty in-memory datastore with the given configuration.
    pub fn open_in_memory_with_config(config: DatastoreConfig) -> CoreResult<Self> {
        Self::open(Box::new(InMemoryBackend::new()), config)
    }

    /// Opens or creates a journal-backed datastore.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal is locked, corrupted or unreadable.
    pub fn open_file(path: &Path, config: DatastoreConfig) -> CoreResult<Self> {
        let backend = if config.create_dirs {
            FileBackend::open_with_create_dirs(path)?
        } else {
            FileBackend::open(path)?
        };
        Self::open(Box::new(backend), config)
    }

    /// Opens an empty table-backed datastore.
    ///
    /// # Errors
    ///
    /// Returns a `Schema` storage error if a reserved column is missing.
    pub fn open_table(schema: TableSchema, config: DatastoreConfig) -> CoreResult<Self> {
        let backend = TableBackend::new(schema)?;
        Self::open(Box::new(backend), config)
    }

    /// The datastore id announced to peers.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The current sequence id.
    pub fn sequence_id(&self) -> u64 {
        self.inner.read().sequence_id
    }

    /// Operation counters.
    pub fn stats(&self) -> &DatastoreStats {
        &self.stats
    }

    /// Number of stored documents, tombstones included.
    pub fn len(&self) -> CoreResult<usize> {
        let inner = self.inner.read();
        Ok(inner.backend.len()?)
    }

    /// Returns true if no document has been stored.
    pub fn is_empty(&self) -> CoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Reads a document, tombstones included.
    ///
    /// # Errors
    ///
    /// Returns a `Corrupted` storage error if the stored document has no
    /// `_rev`.
    pub fn get(&self, id: &str) -> CoreResult<Option<Document>> {
        self.stats.record_read();
        let inner = self.inner.read();
        self.track(stored(inner.backend.as_ref(), id))
    }

    /// Reads a document, hiding tombstones.
    pub fn get_live(&self, id: &str) -> CoreResult<Option<Document>> {
        Ok(self.get(id)?.filter(|doc| !doc.is_deleted()))
    }

    /// Stores `doc` if it beats the stored version of the same id.
    ///
    /// Returns true if the document was written. A losing document changes
    /// nothing, so replaying the same document is always safe.
    ///
    /// # Errors
    ///
    /// Returns `Comparison` if a revision tie cannot be ordered, and any
    /// storage error from the write. On error the sequence id is unchanged.
    pub fn put_if_needed(&self, doc: &Document) -> CoreResult<bool> {
        let mut inner = self.inner.write();
        let result = self.put_locked(&mut inner, doc);
        self.track(result)
    }

    /// Stores a local edit under the next sequence number.
    ///
    /// Any `_rev` on `doc` is replaced, so the edit always supersedes the
    /// stored version. Returns the document as stored.
    pub fn put_with_new_rev(&self, doc: &Document) -> CoreResult<Document> {
        let mut inner = self.inner.write();
        let result = self.put_new_rev_locked(&mut inner, doc.clone());
        self.track(result)
    }

    /// Writes a tombstone for `id`.
    ///
    /// The tombstone keeps the document's fields, sets `_deleted` and takes
    /// the next sequence number. Returns false if the document is absent or
    /// already deleted.
    pub fn delete(&self, id: &str) -> CoreResult<bool> {
        let mut inner = self.inner.write();
        let result = self.delete_locked(&mut inner, id);
        self.track(result)
    }

    /// Returns up to `limit` documents with `_rev > since`, oldest first,
    /// together with the current sequence id.
    ///
    /// Both come from one consistent view of the store. A page never splits
    /// a group of documents sharing one revision, so it can run past
    /// `limit` when revisions from different peers coincide.
    pub fn get_docs_since(&self, since: u64, limit: usize) -> CoreResult<DocsSince> {
        let inner = self.inner.read();
        let documents = self.track(inner.backend.docs_since(since, limit).map_err(Into::into))?;
        self.stats.record_page(documents.len());
        Ok(DocsSince {
            current_sequence_id: inner.sequence_id,
            documents,
        })
    }

    /// Last sequence number consumed from `peer`, or 0.
    pub fn peer_sequence_id(&self, peer: &str) -> u64 {
        self.inner.read().peers.get(peer).copied().unwrap_or(0)
    }

    /// Advances the cursor for `peer`. A value at or below the current
    /// cursor is ignored.
    pub fn set_peer_sequence_id(&self, peer: &str, sequence_id: u64) -> CoreResult<()> {
        let mut inner = self.inner.write();
        let current = inner.peers.get(peer).copied().unwrap_or(0);
        if sequence_id <= current {
            return Ok(());
        }
        self.track(
            inner
                .backend
                .save_peer_sequence(peer, sequence_id)
                .map_err(Into::into),
        )?;
        inner.peers.insert(peer.to_string(), sequence_id);
        debug!(store = %self.id, peer = %peer, sequence_id, "peer cursor advanced");
        Ok(())
    }

    /// All peer cursors.
    pub fn peers(&self) -> BTreeMap<String, u64> {
        self.inner.read().peers.clone()
    }

    /// Verifies every stored document has `_rev` and that no revision is
    /// ahead of the sequence id.
    pub fn check(&self) -> CoreResult<CheckReport> {
        let inner = self.inner.read();
        let mut report = CheckReport {
            sequence_id: inner.sequence_id,
            ..CheckReport::default()
        };

        for id in inner.backend.ids()? {
            report.documents += 1;
            let doc = match inner.backend.raw_get(&id) {
                Ok(Some(doc)) => doc,
                Ok(None) => continue,
                Err(err) => {
                    report.issues.push(CheckIssue::Unreadable {
                        id,
                        error: err.to_string(),
                    });
                    continue;
                }
            };
            if doc.is_deleted() {
                report.tombstones += 1;
            }
            match doc.rev() {
                None => report.issues.push(CheckIssue::MissingRevision { id }),
                Some(rev) => {
                    report.max_rev = report.max_rev.max(rev);
                    if rev > inner.sequence_id {
                        report.issues.push(CheckIssue::RevisionAhead {
                            id,
                            rev,
                            sequence_id: inner.sequence_id,
                        });
                    }
                }
            }
        }

        if !report.is_ok() {
            warn!(store = %self.id, issues = report.issues.len(), "integrity check failed");
        }
        Ok(report)
    }

    fn put_locked(&self, inner: &mut Inner, doc: &Document) -> CoreResult<bool> {
        if doc.id().is_empty() {
            return Err(CoreError::MissingId);
        }
        let incoming_rev = doc.rev().unwrap_or(0);

        let overwrite = match stored(inner.backend.as_ref(), doc.id())? {
            None => true,
            Some(existing) => {
                let existing_rev = existing.rev().unwrap_or(0);
                existing_rev < incoming_rev
                    || (existing_rev == incoming_rev
                        && existing.compare(doc)? == Ordering::Less)
            }
        };

        if !overwrite {
            self.stats.record_ignored_put();
            debug!(store = %self.id, doc_id = %doc.id(), rev = incoming_rev, "put ignored");
            return Ok(false);
        }

        let mut to_store = doc.clone();
        let mut next_sequence_id = inner.sequence_id;
        if incoming_rev == 0 {
            next_sequence_id = next_rev(inner.sequence_id, doc.id())?;
            to_store.set_rev(next_sequence_id)?;
        } else if incoming_rev > next_sequence_id {
            debug!(
                store = %self.id,
                doc_id = %doc.id(),
                from = next_sequence_id,
                to = incoming_rev,
                "sequence id advanced to peer revision"
            );
            next_sequence_id = incoming_rev;
        }

        inner.backend.raw_put(&to_store, next_sequence_id)?;
        inner.sequence_id = next_sequence_id;
        self.stats.record_write();
        debug!(
            store = %self.id,
            doc_id = %to_store.id(),
            rev = ?to_store.rev(),
            "put accepted"
        );
        Ok(true)
    }

    fn delete_locked(&self, inner: &mut Inner, id: &str) -> CoreResult<bool> {
        let Some(mut doc) = stored(inner.backend.as_ref(), id)? else {
            return Ok(false);
        };
        if doc.is_deleted() {
            return Ok(false);
        }
        doc.set_deleted(true);
        let tombstone = self.put_new_rev_locked(inner, doc)?;
        self.stats.record_delete();
        debug!(store = %self.id, doc_id = %id, rev = ?tombstone.rev(), "document deleted");
        Ok(true)
    }

    fn put_new_rev_locked(&self, inner: &mut Inner, mut doc: Document) -> CoreResult<Document> {
        // The stored revision can sit above the counter if the backend lost
        // its state; stamp above both so the edit supersedes it.
        let floor = stored(inner.backend.as_ref(), doc.id())?
            .and_then(|existing| existing.rev())
            .map_or(inner.sequence_id, |rev| rev.max(inner.sequence_id));
        doc.set_rev(next_rev(floor, doc.id())?)?;
        if !self.put_locked(inner, &doc)? {
            return Err(CoreError::invalid_revision(
                doc.id(),
                "new revision did not supersede the stored one",
            ));
        }
        Ok(doc)
    }

    fn track<T>(&self, result: CoreResult<T>) -> CoreResult<T> {
        if result.is_err() {
            self.stats.record_error();
        }
        result
    }
}

/// Reads a stored document and insists it carries `_rev`.
fn stored(backend: &dyn StorageBackend, id: &str) -> CoreResult<Option<Document>> {
    match backend.raw_get(id)? {
        Some(doc) if doc.rev().is_none() => Err(StorageError::corrupted(format!(
            "stored document `{id}` has no _rev"
        ))
        .into()),
        other => Ok(other),
    }
}

fn next_rev(sequence_id: u64, id: &str) -> CoreResult<u64> {
    sequence_id
        .checked_add(1)
        .ok_or_else(|| CoreError::invalid_revision(id, "sequence id exhausted"))
}
