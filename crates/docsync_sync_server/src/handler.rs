//! Request handlers for datastore endpoints.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use docsync_codec::Document;
use docsync_core::{Datastore, DatastoreConfig};
use docsync_sync_protocol::{
    DatastoreInfo, DatastoreList, DocsSinceRequest, DocsSinceResponse, PeerSequenceResponse,
    PutResponse,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// File extension of datastore journals under the data directory.
pub const JOURNAL_EXTENSION: &str = "journal";

/// Context for request handling.
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    /// Hosted datastores by route name.
    stores: RwLock<BTreeMap<String, Arc<Datastore>>>,
}

impl HandlerContext {
    /// Creates a new handler context with no datastores.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            stores: RwLock::new(BTreeMap::new()),
        }
    }

    /// Opens every journal found in the data directory.
    ///
    /// Does nothing for an in-memory server or a missing directory.
    pub fn load_existing(&self) -> ServerResult<usize> {
        let Some(dir) = &self.config.data_dir else {
            return Ok(0);
        };
        if !dir.exists() {
            return Ok(0);
        }
        let entries = fs::read_dir(dir).map_err(|e| ServerError::Internal(e.to_string()))?;
        let mut loaded = 0;
        for entry in entries {
            let path = entry.map_err(|e| ServerError::Internal(e.to_string()))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(JOURNAL_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_name(name).is_err() {
                continue;
            }
            let store = Datastore::open_file(&path, DatastoreConfig::new())?;
            self.stores.write().insert(name.to_string(), Arc::new(store));
            loaded += 1;
        }
        info!(dir = %dir.display(), datastores = loaded, "datastores loaded");
        Ok(loaded)
    }

    /// Looks up a hosted datastore.
    pub fn store(&self, name: &str) -> ServerResult<Arc<Datastore>> {
        self.stores
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ServerError::UnknownDatastore(name.to_string()))
    }

    /// Returns the named datastore, creating it if it does not exist.
    ///
    /// The flag is true if the datastore was created by this call.
    pub fn create_store(&self, name: &str) -> ServerResult<(Arc<Datastore>, bool)> {
        validate_name(name)?;
        let mut stores = self.stores.write();
        if let Some(store) = stores.get(name) {
            return Ok((Arc::clone(store), false));
        }
        let store = match self.journal_path(name) {
            Some(path) => Datastore::open_file(&path, DatastoreConfig::new())?,
            None => Datastore::open_in_memory()?,
        };
        let store = Arc::new(store);
        stores.insert(name.to_string(), Arc::clone(&store));
        info!(name = %name, id = %store.id(), "datastore created");
        Ok((store, true))
    }

    /// Adds an already open datastore under `name`, replacing any other.
    pub fn insert_store(&self, name: &str, store: Arc<Datastore>) -> ServerResult<()> {
        validate_name(name)?;
        self.stores.write().insert(name.to_string(), store);
        Ok(())
    }

    /// Route names of hosted datastores, sorted.
    pub fn names(&self) -> Vec<String> {
        self.stores.read().keys().cloned().collect()
    }

    fn journal_path(&self, name: &str) -> Option<PathBuf> {
        self.config
            .data_dir
            .as_ref()
            .map(|dir| dir.join(format!("{name}.{JOURNAL_EXTENSION}")))
    }
}

/// Datastore names double as file names, so they stay in a safe alphabet.
fn validate_name(name: &str) -> ServerResult<()> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    if valid {
        Ok(())
    } else {
        Err(ServerError::InvalidName(name.to_string()))
    }
}

/// Handler for datastore requests.
pub struct RequestHandler {
    context: Arc<HandlerContext>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    /// Handles `GET /`.
    pub fn handle_list(&self) -> DatastoreList {
        DatastoreList {
            datastores: self.context.names(),
        }
    }

    /// Handles `GET /{store}`.
    pub fn handle_info(&self, name: &str) -> ServerResult<DatastoreInfo> {
        let store = self.context.store(name)?;
        Ok(info_of(name, &store))
    }

    /// Handles `POST /{store}`. The flag is true if the datastore is new.
    pub fn handle_create(&self, name: &str) -> ServerResult<(DatastoreInfo, bool)> {
        if !self.context.config.autocreate {
            let store = self.context.store(name)?;
            return Ok((info_of(name, &store), false));
        }
        let (store, created) = self.context.create_store(name)?;
        Ok((info_of(name, &store), created))
    }

    /// Handles `GET /{store}/doc/{id}`. Tombstones are returned too.
    pub fn handle_get_doc(&self, name: &str, id: &str) -> ServerResult<Document> {
        self.context
            .store(name)?
            .get(id)?
            .ok_or_else(|| ServerError::DocumentNotFound(id.to_string()))
    }

    /// Handles `POST /{store}/doc`.
    ///
    /// With `increment_rev` the document is written as a local edit with a
    /// fresh revision instead of going through conflict resolution.
    pub fn handle_put_doc(
        &self,
        name: &str,
        doc: &Document,
        increment_rev: bool,
    ) -> ServerResult<PutResponse> {
        let store = self.context.store(name)?;
        let written = if increment_rev {
            store.put_with_new_rev(doc)?;
            true
        } else {
            store.put_if_needed(doc)?
        };
        Ok(PutResponse::from_written(written))
    }

    /// Handles `DELETE /{store}/doc/{id}`.
    pub fn handle_delete_doc(&self, name: &str, id: &str) -> ServerResult<PutResponse> {
        let written = self.context.store(name)?.delete(id)?;
        Ok(PutResponse::from_written(written))
    }

    /// Handles `POST /{store}/docs`. The page size is capped by the
    /// configured maximum.
    pub fn handle_docs_since(
        &self,
        name: &str,
        request: DocsSinceRequest,
    ) -> ServerResult<DocsSinceResponse> {
        let limit = request
            .chunk_size
            .clamp(1, self.context.config.max_chunk_size.max(1));
        let page = self
            .context
            .store(name)?
            .get_docs_since(request.start_sequence_id, limit)?;
        Ok(DocsSinceResponse {
            current_sequence_id: page.current_sequence_id,
            documents: page.documents,
        })
    }

    /// Handles `GET /{store}/sequence_id/{peer}`.
    pub fn handle_peer_sequence(&self, name: &str, peer: &str) -> ServerResult<PeerSequenceResponse> {
        let store = self.context.store(name)?;
        Ok(PeerSequenceResponse {
            sequence_id: store.peer_sequence_id(peer),
        })
    }

    /// Handles `POST /{store}/sequence_id/{peer}/{seq}`.
    ///
    /// Answers with the cursor after the update, which stays put if `seq`
    /// is not ahead of it.
    pub fn handle_set_peer_sequence(
        &self,
        name: &str,
        peer: &str,
        sequence_id: u64,
    ) -> ServerResult<PeerSequenceResponse> {
        let store = self.context.store(name)?;
        store.set_peer_sequence_id(peer, sequence_id)?;
        Ok(PeerSequenceResponse {
            sequence_id: store.peer_sequence_id(peer),
        })
    }
}

fn info_of(name: &str, store: &Datastore) -> DatastoreInfo {
    DatastoreInfo {
        name: name.to_string(),
        id: store.id().to_string(),
        sequence_id: store.sequence_id(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_handler(config: ServerConfig) -> RequestHandler {
        RequestHandler::new(Arc::new(HandlerContext::new(config)))
    }

    fn doc(id: &str, value: &str) -> Document {
        Document::new(id).with("value", value).unwrap()
    }

    #[test]
    fn create_then_info() {
        let handler = create_handler(ServerConfig::default());
        assert!(matches!(
            handler.handle_info("notes"),
            Err(ServerError::UnknownDatastore(_))
        ));

        let (info, created) = handler.handle_create("notes").unwrap();
        assert!(created);
        assert_eq!(info.sequence_id, 0);
        let (again, created) = handler.handle_create("notes").unwrap();
        assert!(!created);
        assert_eq!(again.id, info.id);

        assert_eq!(handler.handle_info("notes").unwrap().id, info.id);
        assert_eq!(handler.handle_list().datastores, vec!["notes"]);
    }

    #[test]
    fn autocreate_disabled() {
        let handler = create_handler(ServerConfig::new().with_autocreate(false));
        assert!(matches!(
            handler.handle_create("notes"),
            Err(ServerError::UnknownDatastore(_))
        ));
    }

    #[test]
    fn invalid_names_are_refused() {
        let handler = create_handler(ServerConfig::default());
        for name in ["", ".hidden", "a/b", "sp ace"] {
            assert!(matches!(
                handler.handle_create(name),
                Err(ServerError::InvalidName(_))
            ));
        }
    }

    #[test]
    fn put_get_delete() {
        let handler = create_handler(ServerConfig::default());
        handler.handle_create("notes").unwrap();

        let put = handler.handle_put_doc("notes", &doc("A", "v1"), false).unwrap();
        assert!(put.written());
        let again = handler.handle_put_doc("notes", &doc("A", "v1"), false).unwrap();
        assert!(!again.written());

        assert_eq!(handler.handle_get_doc("notes", "A").unwrap().rev(), Some(1));
        assert!(matches!(
            handler.handle_get_doc("notes", "B"),
            Err(ServerError::DocumentNotFound(_))
        ));

        assert!(handler.handle_delete_doc("notes", "A").unwrap().written());
        assert!(handler.handle_get_doc("notes", "A").unwrap().is_deleted());
    }

    #[test]
    fn increment_rev_forces_a_write() {
        let handler = create_handler(ServerConfig::default());
        handler.handle_create("notes").unwrap();
        handler.handle_put_doc("notes", &doc("A", "v1"), false).unwrap();

        let mut edit = handler.handle_get_doc("notes", "A").unwrap();
        edit.set("value", "v2").unwrap();
        assert!(handler.handle_put_doc("notes", &edit, true).unwrap().written());

        let stored = handler.handle_get_doc("notes", "A").unwrap();
        assert_eq!(stored.rev(), Some(2));
        assert_eq!(stored.get("value"), Some(&"v2".into()));
    }

    #[test]
    fn chunk_size_is_capped() {
        let handler = create_handler(ServerConfig::new().with_max_chunk_size(2));
        handler.handle_create("notes").unwrap();
        for i in 0..5 {
            handler
                .handle_put_doc("notes", &doc(&format!("d{i}"), "v"), false)
                .unwrap();
        }
        let page = handler
            .handle_docs_since(
                "notes",
                DocsSinceRequest {
                    start_sequence_id: 0,
                    chunk_size: 50,
                },
            )
            .unwrap();
        assert_eq!(page.current_sequence_id, 5);
        assert_eq!(page.documents.len(), 2);
    }

    #[test]
    fn peer_cursor_only_advances() {
        let handler = create_handler(ServerConfig::default());
        handler.handle_create("notes").unwrap();
        assert_eq!(handler.handle_peer_sequence("notes", "p").unwrap().sequence_id, 0);
        let set = handler.handle_set_peer_sequence("notes", "p", 7).unwrap();
        assert_eq!(set.sequence_id, 7);
        let lower = handler.handle_set_peer_sequence("notes", "p", 3).unwrap();
        assert_eq!(lower.sequence_id, 7);
    }

    #[test]
    fn journals_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::new().with_data_dir(dir.path());

        let id = {
            let handler = create_handler(config.clone());
            let (info, _) = handler.handle_create("notes").unwrap();
            handler.handle_put_doc("notes", &doc("A", "v1"), false).unwrap();
            info.id
        };

        let context = Arc::new(HandlerContext::new(config));
        assert_eq!(context.load_existing().unwrap(), 1);
        let handler = RequestHandler::new(context);
        let info = handler.handle_info("notes").unwrap();
        assert_eq!(info.id, id);
        assert_eq!(info.sequence_id, 1);
    }
}
