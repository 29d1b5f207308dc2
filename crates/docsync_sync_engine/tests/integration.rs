//! Integration tests for the sync engine against the sync server.

use docsync_codec::Document;
use docsync_core::{Datastore, DatastoreConfig};
use docsync_sync_engine::{
    sync, DocumentStore, HttpResponse, LoopbackClient, LoopbackServer, RemoteDatastore,
    Replicator, SyncConfig, SyncError,
};
use docsync_sync_protocol::Method;
use docsync_sync_server::{ServerConfig, SyncServer};
use std::sync::Arc;

/// Routes loopback requests into an in-process server.
struct InProcess {
    server: Arc<SyncServer>,
}

impl LoopbackServer for InProcess {
    fn handle(&self, method: Method, path: &str, body: &[u8]) -> HttpResponse {
        let response = self.server.handle(method, path, body);
        HttpResponse::new(response.status, response.body)
    }
}

type Remote = RemoteDatastore<LoopbackClient<InProcess>>;

fn remote(server: &Arc<SyncServer>, name: &str) -> Remote {
    let client = LoopbackClient::new(InProcess {
        server: Arc::clone(server),
    });
    RemoteDatastore::connect_or_create("http://localhost:8080", name, client).unwrap()
}

fn local(id: &str) -> Datastore {
    Datastore::open_in_memory_with_config(DatastoreConfig::new().id(id)).unwrap()
}

fn doc(id: &str, value: &str) -> Document {
    Document::new(id).with("value", value).unwrap()
}

fn seed(store: &impl DocumentStore, docs: &[(&str, &str)]) {
    for (id, value) in docs {
        store.put_if_needed(&doc(id, value)).unwrap();
    }
}

fn snapshot(store: &impl DocumentStore, ids: &[&str]) -> Vec<Option<Document>> {
    ids.iter().map(|id| store.get(id).unwrap()).collect()
}

#[test]
fn remote_sync_matches_local_sync() {
    let docs_a = [("A", "a1"), ("B", "a2"), ("C", "a3")];
    let docs_b = [("B", "b2"), ("D", "b4")];
    let ids = ["A", "B", "C", "D"];

    let local_a = local("a");
    let local_b = local("b");
    seed(&local_a, &docs_a);
    seed(&local_b, &docs_b);
    sync(&local_a, &local_b).unwrap();

    let server = Arc::new(SyncServer::new(ServerConfig::default()));
    let client_a = local("a");
    let server_b = remote(&server, "b");
    seed(&client_a, &docs_a);
    seed(&server_b, &docs_b);
    sync(&client_a, &server_b).unwrap();

    assert_eq!(snapshot(&client_a, &ids), snapshot(&server_b, &ids));
    // Store ids differ between the runs, so compare contents, not cursors.
    assert_eq!(snapshot(&client_a, &ids), snapshot(&local_a, &ids));
}

#[test]
fn remote_resync_is_a_no_op() {
    let server = Arc::new(SyncServer::new(ServerConfig::default()));
    let client = local("client");
    let hosted = remote(&server, "notes");
    seed(&client, &[("A", "v1"), ("B", "v1")]);
    seed(&hosted, &[("C", "v1")]);

    let replicator = Replicator::new(SyncConfig::new().with_page_size(1));
    let first = replicator.sync(&client, &hosted).unwrap();
    assert_eq!(first.documents_written(), 3);

    let second = replicator.sync(&client, &hosted).unwrap();
    assert_eq!(second.documents_written(), 0);
    assert_eq!(hosted.peer_sequence_id(client.id()).unwrap(), 2);
    assert_eq!(client.peer_sequence_id(hosted.id()), 2);
}

#[test]
fn remote_deletes_replicate() {
    let server = Arc::new(SyncServer::new(ServerConfig::default()));
    let hosted = remote(&server, "notes");
    let client = local("client");
    seed(&client, &[("A", "v1")]);
    sync(&client, &hosted).unwrap();

    assert!(hosted.delete("A").unwrap());
    assert!(!hosted.delete("missing").unwrap());
    sync(&client, &hosted).unwrap();
    assert!(client.get("A").unwrap().unwrap().is_deleted());
}

#[test]
fn missing_remote_document_is_none() {
    let server = Arc::new(SyncServer::new(ServerConfig::default()));
    let hosted = remote(&server, "notes");
    assert_eq!(hosted.get("nothing").unwrap(), None);
}

#[test]
fn unknown_remote_datastore_is_transport_error() {
    let server = Arc::new(SyncServer::new(ServerConfig::default()));
    let client = LoopbackClient::new(InProcess { server });
    let err = RemoteDatastore::connect("http://localhost:8080", "absent", client).unwrap_err();
    assert!(matches!(
        err,
        SyncError::Transport {
            status: Some(404),
            ..
        }
    ));
    assert!(!err.is_retryable());
}

#[test]
fn rejected_put_surfaces_status() {
    let server = Arc::new(SyncServer::new(ServerConfig::default()));
    let hosted = remote(&server, "notes");
    let mut first = Document::new("A").with("v", 1).unwrap();
    first.set_rev(1).unwrap();
    hosted.put_if_needed(&first).unwrap();

    let mut clash = Document::new("A").with("v", "text").unwrap();
    clash.set_rev(1).unwrap();
    let err = hosted.put_if_needed(&clash).unwrap_err();
    assert!(matches!(
        err,
        SyncError::Transport {
            status: Some(422),
            ..
        }
    ));
}

#[test]
fn small_server_chunks_still_converge() {
    let server = Arc::new(SyncServer::new(ServerConfig::new().with_max_chunk_size(2)));
    let hosted = remote(&server, "notes");
    let client = local("client");
    for i in 0..7 {
        hosted.put_if_needed(&doc(&format!("d{i}"), "v")).unwrap();
    }

    // Pages come back shorter than the client asked for.
    let stats = Replicator::new(SyncConfig::new().with_page_size(10))
        .pull(&hosted, &client)
        .unwrap();
    assert_eq!(stats.documents_written, 7);
    assert_eq!(client.len().unwrap(), 7);
}

/// Answers datastore info for `/notes` but sends every other request to a
/// datastore the server does not host.
struct Vanished {
    server: Arc<SyncServer>,
}

impl LoopbackServer for Vanished {
    fn handle(&self, method: Method, path: &str, body: &[u8]) -> HttpResponse {
        let path = match path.strip_prefix("/notes/") {
            Some(rest) => format!("/gone/{rest}"),
            None => path.to_string(),
        };
        let response = self.server.handle(method, &path, body);
        HttpResponse::new(response.status, response.body)
    }
}

#[test]
fn get_from_unhosted_datastore_is_transport_error() {
    let server = Arc::new(SyncServer::new(ServerConfig::default()));
    let client = LoopbackClient::new(Vanished { server });
    let hosted = RemoteDatastore::connect_or_create("http://localhost:8080", "notes", client)
        .unwrap();

    let err = hosted.get("A").unwrap_err();
    assert!(matches!(
        err,
        SyncError::Transport {
            status: Some(404),
            ..
        }
    ));
}

#[test]
fn file_backed_client_resumes_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let journal = dir.path().join("client.journal");
    let server = Arc::new(SyncServer::new(ServerConfig::default()));
    let hosted = remote(&server, "notes");
    seed(&hosted, &[("A", "v1"), ("B", "v1")]);

    let client = Datastore::open_file(&journal, DatastoreConfig::new().id("client")).unwrap();
    seed(&client, &[("C", "v1")]);
    let first = sync(&client, &hosted).unwrap();
    assert_eq!(first.documents_written(), 3);
    drop(client);

    let client = Datastore::open_file(&journal, DatastoreConfig::new()).unwrap();
    assert_eq!(client.id(), "client");
    assert_eq!(client.peer_sequence_id(hosted.id()), 2);
    assert_eq!(
        snapshot(&client, &["A", "B", "C"]),
        snapshot(&hosted, &["A", "B", "C"])
    );

    let second = sync(&client, &hosted).unwrap();
    assert_eq!(second.documents_written(), 0);
}
