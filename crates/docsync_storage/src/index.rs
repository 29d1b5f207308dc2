//! In-memory document map with a revision index.

use crate::error::{StorageError, StorageResult};
use docsync_codec::Document;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

/// Ordered `(rev, id)` pairs, the shape every backend pages over.
pub(crate) type RevisionIndex = BTreeSet<(u64, String)>;

/// Returns the `_rev` of a document handed to `raw_put`.
pub(crate) fn require_rev(doc: &Document) -> StorageResult<u64> {
    doc.rev().ok_or_else(|| {
        StorageError::corrupted(format!("document `{}` has no _rev", doc.id()))
    })
}

/// Selects one page of ids with `rev > since`.
///
/// Stops after `limit` entries unless the next entry shares the revision of
/// the last one taken.
pub(crate) fn page(index: &RevisionIndex, since: u64, limit: usize) -> Vec<&str> {
    let Some(first) = since.checked_add(1) else {
        return Vec::new();
    };

    let mut ids = Vec::new();
    let mut last_rev = None;
    for (rev, id) in index.range((Bound::Included((first, String::new())), Bound::Unbounded)) {
        if ids.len() >= limit && last_rev != Some(*rev) {
            break;
        }
        ids.push(id.as_str());
        last_rev = Some(*rev);
    }
    ids
}

/// Documents keyed by id, plus the revision index over them.
#[derive(Debug, Default, Clone)]
pub(crate) struct DocumentIndex {
    docs: BTreeMap<String, Document>,
    by_rev: RevisionIndex,
}

impl DocumentIndex {
    pub(crate) fn get(&self, id: &str) -> Option<&Document> {
        self.docs.get(id)
    }

    /// Inserts or replaces a document. The document must carry `_rev`.
    pub(crate) fn insert(&mut self, doc: Document) -> StorageResult<()> {
        let rev = require_rev(&doc)?;
        let id = doc.id().to_string();
        if let Some(old_rev) = self.docs.insert(id.clone(), doc).and_then(|old| old.rev()) {
            self.by_rev.remove(&(old_rev, id.clone()));
        }
        self.by_rev.insert((rev, id));
        Ok(())
    }

    pub(crate) fn since(&self, since: u64, limit: usize) -> Vec<Document> {
        page(&self.by_rev, since, limit)
            .into_iter()
            .filter_map(|id| self.docs.get(id).cloned())
            .collect()
    }

    pub(crate) fn ids(&self) -> Vec<String> {
        self.docs.keys().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.docs.len()
    }
}
