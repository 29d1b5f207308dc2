//! Cross-crate integration test helpers.
//!
//! Provides an in-process host for the sync server and assertions over
//! whole datastores.

use crate::generators::StoreOperation;
use docsync_codec::Document;
use docsync_core::{CoreResult, Datastore};
use docsync_sync_engine::{
    DocumentStore, HttpResponse, LoopbackClient, LoopbackServer, RemoteDatastore,
};
use docsync_sync_protocol::Method;
use docsync_sync_server::{ServerConfig, SyncServer};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Base URL used for loopback remotes. Never resolved.
pub const LOOPBACK_URL: &str = "http://loopback.invalid";

/// Serves loopback requests from an in-process [`SyncServer`].
#[derive(Clone)]
pub struct LoopbackHost {
    server: Arc<SyncServer>,
}

impl LoopbackHost {
    /// Hosts a new in-memory server.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            server: Arc::new(SyncServer::new(config)),
        }
    }

    /// Wraps an existing server.
    pub fn with_server(server: Arc<SyncServer>) -> Self {
        Self { server }
    }

    /// The hosted server.
    pub fn server(&self) -> &Arc<SyncServer> {
        &self.server
    }

    /// Connects to `name` on this host, creating it if needed.
    pub fn remote(&self, name: &str) -> HostedRemote {
        RemoteDatastore::connect_or_create(
            LOOPBACK_URL,
            name,
            LoopbackClient::new(self.clone()),
        )
        .expect("Failed to connect to loopback datastore")
    }
}

impl Default for LoopbackHost {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

impl LoopbackServer for LoopbackHost {
    fn handle(&self, method: Method, path: &str, body: &[u8]) -> HttpResponse {
        let response = self.server.handle(method, path, body);
        HttpResponse::new(response.status, response.body)
    }
}

/// A remote datastore reached through a [`LoopbackHost`].
pub type HostedRemote = RemoteDatastore<LoopbackClient<LoopbackHost>>;

/// Reads every document of a store, tombstones included, keyed by id.
pub fn all_documents<S: DocumentStore + ?Sized>(store: &S) -> BTreeMap<String, Document> {
    let mut docs = BTreeMap::new();
    let mut since = 0;
    loop {
        let page = store
            .get_docs_since(since, 100)
            .expect("Failed to read documents");
        if page.documents.is_empty() {
            return docs;
        }
        for doc in page.documents {
            since = since.max(doc.rev().unwrap_or(0));
            docs.insert(doc.id().to_string(), doc);
        }
    }
}

/// Asserts that two stores hold exactly the same documents.
pub fn assert_converged<A, B>(a: &A, b: &B)
where
    A: DocumentStore + ?Sized,
    B: DocumentStore + ?Sized,
{
    let left = all_documents(a);
    let right = all_documents(b);
    assert_eq!(
        left.keys().collect::<Vec<_>>(),
        right.keys().collect::<Vec<_>>(),
        "{} and {} hold different ids",
        a.id(),
        b.id()
    );
    for (id, doc) in &left {
        assert_eq!(Some(doc), right.get(id), "document {id} differs");
    }
}

/// Applies one generated operation. Returns whether a write happened.
pub fn apply(store: &Datastore, op: &StoreOperation) -> CoreResult<bool> {
    match op {
        StoreOperation::Put { doc } => store.put_if_needed(doc),
        StoreOperation::Edit { doc } => store.put_with_new_rev(doc).map(|_| true),
        StoreOperation::Delete { id } => store.delete(id),
    }
}
