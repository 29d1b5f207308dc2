//! Integrity check results.

use std::fmt;

/// A problem found by [`crate::Datastore::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckIssue {
    /// A stored document has no `_rev`.
    MissingRevision {
        /// Document id.
        id: String,
    },
    /// A stored revision is ahead of the datastore counter.
    RevisionAhead {
        /// Document id.
        id: String,
        /// The stored revision.
        rev: u64,
        /// The datastore's sequence id.
        sequence_id: u64,
    },
    /// The backend could not produce the document.
    Unreadable {
        /// Document id.
        id: String,
        /// The backend error.
        error: String,
    },
}

impl fmt::Display for CheckIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckIssue::MissingRevision { id } => write!(f, "{id}: no _rev"),
            CheckIssue::RevisionAhead {
                id,
                rev,
                sequence_id,
            } => write!(f, "{id}: _rev {rev} is ahead of sequence id {sequence_id}"),
            CheckIssue::Unreadable { id, error } => write!(f, "{id}: {error}"),
        }
    }
}

/// Summary of an integrity check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Documents examined, tombstones included.
    pub documents: usize,
    /// Tombstones among them.
    pub tombstones: usize,
    /// The datastore's sequence id at the time of the check.
    pub sequence_id: u64,
    /// Highest revision seen.
    pub max_rev: u64,
    /// Every problem found.
    pub issues: Vec<CheckIssue>,
}

impl CheckReport {
    /// Returns true if no problem was found.
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }
}
