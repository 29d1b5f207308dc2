//! Cursor-based replication between two datastores.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::store::DocumentStore;
use tracing::{debug, info};

/// Outcome of one [`Replicator::pull`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullStats {
    /// Id of the store pulled from.
    pub source: String,
    /// Id of the store written to.
    pub target: String,
    /// Documents read from the source.
    pub documents_received: u64,
    /// Documents the target actually wrote.
    pub documents_written: u64,
    /// Pages requested.
    pub pages: u64,
    /// The target's cursor for the source after the pull.
    pub cursor: u64,
}

/// Outcome of one [`Replicator::sync`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// The pull from `a` into `b`.
    pub a_to_b: PullStats,
    /// The pull from `b` into `a`.
    pub b_to_a: PullStats,
}

impl SyncStats {
    /// Documents written on either side.
    pub fn documents_written(&self) -> u64 {
        self.a_to_b.documents_written + self.b_to_a.documents_written
    }
}

/// Drives replication between pairs of stores.
///
/// # Example
///
/// ```rust
/// use docsync_codec::Document;
/// use docsync_core::Datastore;
/// use docsync_sync_engine::{Replicator, SyncConfig};
///
/// let a = Datastore::open_in_memory().unwrap();
/// let b = Datastore::open_in_memory().unwrap();
/// a.put_if_needed(&Document::new("A").with("value", "v1").unwrap()).unwrap();
///
/// let replicator = Replicator::new(SyncConfig::default());
/// replicator.sync(&a, &b).unwrap();
/// assert_eq!(a.get("A").unwrap(), b.get("A").unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Replicator {
    config: SyncConfig,
}

impl Replicator {
    /// Creates a replicator.
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Copies everything `target` has not yet seen from `source`.
    ///
    /// Starts at the target's cursor for the source and walks the source's
    /// change feed page by page, offering each document to
    /// `target.put_if_needed`. An empty page ends the walk, and the cursor
    /// is set to the source's sequence id from that page. Pages may come
    /// back shorter than asked (a server can cap them), so only an empty
    /// one counts as the end.
    ///
    /// An interrupted pull leaves the cursor untouched, so the next pull
    /// repeats the work; `put_if_needed` makes that harmless.
    ///
    /// # Errors
    ///
    /// Propagates any store error. Returns `Protocol` if source and target
    /// are the same store, or the source serves a document without `_rev`
    /// or at or below the requested cursor.
    pub fn pull<S, T>(&self, source: &S, target: &T) -> SyncResult<PullStats>
    where
        S: DocumentStore + ?Sized,
        T: DocumentStore + ?Sized,
    {
        let peer = source.id().to_string();
        if peer == target.id() {
            return Err(SyncError::protocol(format!(
                "cannot pull datastore `{peer}` into itself"
            )));
        }

        let page_size = self.config.page_size.max(1);
        let mut since = target.peer_sequence_id(&peer)?;
        let mut stats = PullStats {
            source: peer.clone(),
            target: target.id().to_string(),
            ..PullStats::default()
        };

        let source_sequence_id = loop {
            let requested = since;
            let page = source.get_docs_since(requested, page_size)?;
            stats.pages += 1;

            for doc in &page.documents {
                let rev = doc.rev().ok_or_else(|| {
                    SyncError::protocol(format!(
                        "datastore `{peer}` served `{}` without _rev",
                        doc.id()
                    ))
                })?;
                // Every served revision must pass the cursor, or the walk
                // would never reach an empty page.
                if rev <= requested {
                    return Err(SyncError::protocol(format!(
                        "datastore `{peer}` served a stale page: `{}` at _rev {rev} \
                         for a request since {requested}",
                        doc.id()
                    )));
                }
                stats.documents_received += 1;
                if target.put_if_needed(doc)? {
                    stats.documents_written += 1;
                }
                since = since.max(rev);
            }

            debug!(
                source = %peer,
                target = %stats.target,
                documents = page.documents.len(),
                since,
                "page pulled"
            );

            if page.documents.is_empty() {
                break page.current_sequence_id;
            }
        };

        target.set_peer_sequence_id(&peer, source_sequence_id)?;
        stats.cursor = target.peer_sequence_id(&peer)?;

        info!(
            source = %stats.source,
            target = %stats.target,
            received = stats.documents_received,
            written = stats.documents_written,
            pages = stats.pages,
            cursor = stats.cursor,
            "pull complete"
        );
        Ok(stats)
    }

    /// Pulls `a` into `b`, then `b` into `a`.
    ///
    /// With no concurrent writes both stores hold identical documents
    /// afterwards, and running it again writes nothing.
    pub fn sync<A, B>(&self, a: &A, b: &B) -> SyncResult<SyncStats>
    where
        A: DocumentStore + ?Sized,
        B: DocumentStore + ?Sized,
    {
        let a_to_b = self.pull(a, b)?;
        let b_to_a = self.pull(b, a)?;
        let stats = SyncStats { a_to_b, b_to_a };
        info!(
            a = %a.id(),
            b = %b.id(),
            written = stats.documents_written(),
            "sync complete"
        );
        Ok(stats)
    }
}

/// Pulls with the default configuration.
pub fn pull<S, T>(source: &S, target: &T) -> SyncResult<PullStats>
where
    S: DocumentStore + ?Sized,
    T: DocumentStore + ?Sized,
{
    Replicator::default().pull(source, target)
}

/// Syncs both directions with the default configuration.
pub fn sync<A, B>(a: &A, b: &B) -> SyncResult<SyncStats>
where
    A: DocumentStore + ?Sized,
    B: DocumentStore + ?Sized,
{
    Replicator::default().sync(a, b)
}
