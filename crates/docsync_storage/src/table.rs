//! Column-mapped storage backend modelled on a relational table.
//!
//! Documents are stored as fixed-width rows over a declared column list, and
//! the sequence counter lives in a separate revisions table keyed by
//! datastore id, mirroring how a SQL deployment keeps one
//! `(datastore_id, sequence_id)` row beside each synced table.

use crate::backend::{StorageBackend, StoreState};
use crate::error::{StorageError, StorageResult};
use crate::index::{page, require_rev, RevisionIndex};
use docsync_codec::{Document, Value, DELETED_FIELD, ID_FIELD, REV_FIELD};
use std::collections::BTreeMap;

/// Column layout of a synced table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    name: String,
    columns: Vec<String>,
}

impl TableSchema {
    /// Creates a schema with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Creates a schema holding the reserved columns.
    pub fn synced(name: impl Into<String>) -> Self {
        Self::new(name)
            .with_column(ID_FIELD)
            .with_column(REV_FIELD)
            .with_column(DELETED_FIELD)
    }

    /// Adds a column. Adding an existing column is a no-op.
    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        if !self.columns.contains(&column) {
            self.columns.push(column);
        }
        self
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared columns, in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Checks that every reserved column is declared.
    pub fn validate(&self) -> StorageResult<()> {
        for reserved in [ID_FIELD, REV_FIELD, DELETED_FIELD] {
            if self.position(reserved).is_none() {
                return Err(StorageError::schema(&self.name, reserved));
            }
        }
        Ok(())
    }
}

/// A storage backend that keeps documents as rows of a [`TableSchema`].
///
/// Rows are full rows: a column the document did not carry is stored as
/// null and comes back as null. `_deleted` is only surfaced when it is
/// `true`.
#[derive(Debug)]
pub struct TableBackend {
    schema: TableSchema,
    rows: BTreeMap<String, Vec<Value>>,
    by_rev: RevisionIndex,
    /// The side revisions table: datastore id to sequence id.
    revisions: BTreeMap<String, u64>,
    peers: BTreeMap<String, u64>,
    store_id: Option<String>,
}

impl TableBackend {
    /// Creates an empty table.
    ///
    /// # Errors
    ///
    /// Returns `Schema` if `_id`, `_rev` or `_deleted` is not declared.
    pub fn new(schema: TableSchema) -> StorageResult<Self> {
        schema.validate()?;
        Ok(Self {
            schema,
            rows: BTreeMap::new(),
            by_rev: RevisionIndex::new(),
            revisions: BTreeMap::new(),
            peers: BTreeMap::new(),
            store_id: None,
        })
    }

    /// The table layout.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn revisions_key(&self) -> &str {
        self.store_id.as_deref().unwrap_or_default()
    }

    fn to_row(&self, doc: &Document) -> StorageResult<Vec<Value>> {
        let unknown = doc.iter().find(|(k, _)| self.schema.position(k).is_none());
        if let Some((unknown, _)) = unknown {
            return Err(StorageError::schema(&self.schema.name, unknown));
        }
        Ok(self
            .schema
            .columns
            .iter()
            .map(|column| doc.get(column).cloned().unwrap_or(Value::Null))
            .collect())
    }

    fn row_rev(&self, row: &[Value]) -> Option<u64> {
        self.schema
            .position(REV_FIELD)
            .and_then(|i| row.get(i))
            .and_then(Value::as_integer)
            .and_then(|n| u64::try_from(n).ok())
    }

    fn to_document(&self, row: &[Value]) -> StorageResult<Document> {
        let mut fields = BTreeMap::new();
        for (column, value) in self.schema.columns.iter().zip(row) {
            if column == DELETED_FIELD && *value != Value::Bool(true) {
                continue;
            }
            fields.insert(column.clone(), value.clone());
        }
        let doc = Document::from_fields(fields)?;
        require_rev(&doc)?;
        Ok(doc)
    }
}

impl StorageBackend for TableBackend {
    fn load_state(&self) -> StorageResult<StoreState> {
        Ok(StoreState {
            store_id: self.store_id.clone(),
            sequence_id: self
                .revisions
                .get(self.revisions_key())
                .copied()
                .unwrap_or(0),
            peers: self.peers.clone(),
        })
    }

    fn raw_get(&self, id: &str) -> StorageResult<Option<Document>> {
        self.rows
            .get(id)
            .map(|row| self.to_document(row))
            .transpose()
    }

    fn raw_put(&mut self, doc: &Document, sequence_id: u64) -> StorageResult<()> {
        let rev = require_rev(doc)?;
        let row = self.to_row(doc)?;
        let id = doc.id().to_string();

        let replaced = self.rows.insert(id.clone(), row);
        if let Some(old_rev) = replaced.and_then(|old| self.row_rev(&old)) {
            self.by_rev.remove(&(old_rev, id.clone()));
        }
        self.by_rev.insert((rev, id));

        let key = self.revisions_key().to_string();
        self.revisions.insert(key, sequence_id);
        Ok(())
    }

    fn docs_since(&self, since: u64, limit: usize) -> StorageResult<Vec<Document>> {
        page(&self.by_rev, since, limit)
            .into_iter()
            .filter_map(|id| self.rows.get(id))
            .map(|row| self.to_document(row))
            .collect()
    }

    fn save_peer_sequence(&mut self, peer: &str, sequence_id: u64) -> StorageResult<()> {
        self.peers.insert(peer.to_string(), sequence_id);
        Ok(())
    }

    fn save_store_id(&mut self, store_id: &str) -> StorageResult<()> {
        // Carry a counter recorded before the id was known over to the new key.
        let previous = self.revisions_key().to_string();
        if let Some(seq) = self.revisions.remove(&previous) {
            self.revisions.entry(store_id.to_string()).or_insert(seq);
        }
        self.store_id = Some(store_id.to_string());
        Ok(())
    }

    fn ids(&self) -> StorageResult<Vec<String>> {
        Ok(self.rows.keys().cloned().collect())
    }

    fn len(&self) -> StorageResult<usize> {
        Ok(self.rows.len())
    }
}
