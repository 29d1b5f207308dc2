//! File-based storage backend for durable stores.
//!
//! The backend keeps every document in memory and mirrors each change to an
//! append-only journal of JSON lines:
//!
//! ```text
//! {"kind":"store","store_id":"9f1c...","version":1}
//! {"kind":"put","sequence_id":1,"doc":{"_id":"A","_rev":1,"value":"v1"}}
//! {"kind":"peer","peer":"4be0...","sequence_id":12}
//! ```
//!
//! The trailing newline commits a record. Opening the journal replays every
//! committed record; a final line without its newline is a write that never
//! finished and is cut off.

use crate::backend::{StorageBackend, StoreState};
use crate::error::{StorageError, StorageResult};
use crate::index::{require_rev, DocumentIndex};
use docsync_codec::{CodecError, Document};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Journal format version written in store records.
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Record {
    Store { store_id: String, version: u32 },
    Put { sequence_id: u64, doc: Document },
    Peer { peer: String, sequence_id: u64 },
}

/// A durable storage backend over a JSON-lines journal.
///
/// # Durability
///
/// Every record is flushed and `sync_data`ed before the call returns. A
/// record that fails to write is cut back off the file, so the journal only
/// ever holds whole records.
///
/// # Locking
///
/// The journal is held under an exclusive advisory lock for the lifetime of
/// the backend. A second open, from this or another process, fails with
/// [`StorageError::Locked`].
///
/// # Example
///
/// ```no_run
/// use docsync_storage::{FileBackend, StorageBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open(Path::new("store.jsonl")).unwrap();
/// let state = backend.load_state().unwrap();
/// println!("sequence id {}", state.sequence_id);
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    file: File,
    len: u64,
    docs: DocumentIndex,
    state: StoreState,
}

impl FileBackend {
    /// Opens or creates a journal at the given path and replays it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Another handle holds the lock (returns `Locked`)
    /// - A committed record cannot be parsed (returns `Corrupted`)
    /// - The file cannot be opened, read or truncated
    pub fn open(path: &Path) -> StorageResult<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        if file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked(path.to_path_buf()));
        }

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let mut backend = Self {
            path: path.to_path_buf(),
            file,
            len: 0,
            docs: DocumentIndex::default(),
            state: StoreState::default(),
        };
        let committed = backend.replay(&bytes)?;
        backend.len = committed as u64;

        if committed < bytes.len() {
            warn!(
                path = %path.display(),
                offset = committed,
                dropped = bytes.len() - committed,
                "truncating torn journal record"
            );
            backend.file.set_len(backend.len)?;
            backend.file.sync_all()?;
        }

        debug!(
            path = %path.display(),
            documents = backend.docs.len(),
            sequence_id = backend.state.sequence_id,
            "journal opened"
        );
        Ok(backend)
    }

    /// Opens or creates a journal, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the journal
    /// cannot be opened.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    /// Returns the path to the journal file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the journal size in bytes.
    #[must_use]
    pub fn journal_len(&self) -> u64 {
        self.len
    }

    /// Applies every committed line and returns the committed byte length.
    fn replay(&mut self, bytes: &[u8]) -> StorageResult<usize> {
        let mut offset = 0;
        let mut line_no = 0;
        while let Some(end) = bytes[offset..].iter().position(|b| *b == b'\n') {
            line_no += 1;
            let line = &bytes[offset..offset + end];
            if !line.iter().all(u8::is_ascii_whitespace) {
                let record: Record = serde_json::from_slice(line).map_err(|e| {
                    StorageError::corrupted(format!(
                        "{} line {line_no}: {e}",
                        self.path.display()
                    ))
                })?;
                self.apply(record)?;
            }
            offset += end + 1;
        }
        Ok(offset)
    }

    fn apply(&mut self, record: Record) -> StorageResult<()> {
        match record {
            Record::Store { store_id, version } => {
                if version > FORMAT_VERSION {
                    return Err(StorageError::corrupted(format!(
                        "{}: unsupported journal version {version}",
                        self.path.display()
                    )));
                }
                self.state.store_id = Some(store_id);
            }
            Record::Put { sequence_id, doc } => {
                self.docs.insert(doc)?;
                self.state.sequence_id = sequence_id;
            }
            Record::Peer { peer, sequence_id } => {
                self.state.peers.insert(peer, sequence_id);
            }
        }
        Ok(())
    }

    fn append(&mut self, record: &Record) -> StorageResult<()> {
        let mut line =
            serde_json::to_vec(record).map_err(|e| CodecError::encoding_failed(e.to_string()))?;
        line.push(b'\n');

        if let Err(err) = self.write_line(&line) {
            // Cut off any partial record; the write error is what the caller sees.
            let _ = self.file.set_len(self.len);
            return Err(err.into());
        }
        self.len += line.len() as u64;
        Ok(())
    }

    fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        self.file.write_all(line)?;
        self.file.flush()?;
        self.file.sync_data()
    }
}

impl StorageBackend for FileBackend {
    fn load_state(&self) -> StorageResult<StoreState> {
        Ok(self.state.clone())
    }

    fn raw_get(&self, id: &str) -> StorageResult<Option<Document>> {
        Ok(self.docs.get(id).cloned())
    }

    fn raw_put(&mut self, doc: &Document, sequence_id: u64) -> StorageResult<()> {
        require_rev(doc)?;
        self.append(&Record::Put {
            sequence_id,
            doc: doc.clone(),
        })?;
        self.docs.insert(doc.clone())?;
        self.state.sequence_id = sequence_id;
        Ok(())
    }

    fn docs_since(&self, since: u64, limit: usize) -> StorageResult<Vec<Document>> {
        Ok(self.docs.since(since, limit))
    }

    fn save_peer_sequence(&mut self, peer: &str, sequence_id: u64) -> StorageResult<()> {
        self.append(&Record::Peer {
            peer: peer.to_string(),
            sequence_id,
        })?;
        self.state.peers.insert(peer.to_string(), sequence_id);
        Ok(())
    }

    fn save_store_id(&mut self, store_id: &str) -> StorageResult<()> {
        if self.state.store_id.as_deref() == Some(store_id) {
            return Ok(());
        }
        self.append(&Record::Store {
            store_id: store_id.to_string(),
            version: FORMAT_VERSION,
        })?;
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
