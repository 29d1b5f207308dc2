//! A datastore hosted behind the sync server's HTTP routes.

use crate::error::{SyncError, SyncResult};
use crate::http::{join, HttpClient, HttpResponse};
use crate::store::DocumentStore;
use docsync_codec::Document;
use docsync_core::DocsSince;
use docsync_sync_protocol::{
    decode, encode, DatastoreInfo, DocsSinceRequest, DocsSinceResponse, ErrorBody, Method,
    PeerSequenceResponse, PutResponse, Route,
};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Client side of one remote datastore.
///
/// Every [`DocumentStore`] call is one HTTP request. The remote id is
/// fetched once when connecting and reused for peer cursors.
pub struct RemoteDatastore<C: HttpClient> {
    /// Base URL of the sync server (e.g., "http://localhost:8080").
    base_url: String,
    /// Route name of the datastore on the server.
    store: String,
    /// Datastore id reported by the server.
    id: String,
    client: C,
    connected: AtomicBool,
    last_error: RwLock<Option<String>>,
}

impl<C: HttpClient> std::fmt::Debug for RemoteDatastore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteDatastore")
            .field("base_url", &self.base_url)
            .field("store", &self.store)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl<C: HttpClient> RemoteDatastore<C> {
    /// Connects to an existing datastore.
    ///
    /// # Errors
    ///
    /// Returns `Transport` with status 404 if the server does not host
    /// `store`.
    pub fn connect(
        base_url: impl Into<String>,
        store: impl Into<String>,
        client: C,
    ) -> SyncResult<Self> {
        Self::open(base_url.into(), store.into(), client, Method::Get)
    }

    /// Connects to a datastore, asking the server to create it if needed.
    pub fn connect_or_create(
        base_url: impl Into<String>,
        store: impl Into<String>,
        client: C,
    ) -> SyncResult<Self> {
        Self::open(base_url.into(), store.into(), client, Method::Post)
    }

    fn open(base_url: String, store: String, client: C, method: Method) -> SyncResult<Self> {
        let mut remote = Self {
            base_url,
            store,
            id: String::new(),
            client,
            connected: AtomicBool::new(true),
            last_error: RwLock::new(None),
        };
        let route = Route::Datastore {
            store: remote.store.clone(),
        };
        let info: DatastoreInfo = remote.call(method, &route, Vec::new())?;
        debug!(
            url = %remote.base_url,
            store = %remote.store,
            id = %info.id,
            sequence_id = info.sequence_id,
            "connected to remote datastore"
        );
        remote.id = info.id;
        Ok(remote)
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Route name of the datastore on the server.
    pub fn store(&self) -> &str {
        &self.store
    }

    /// Fetches the datastore's current info.
    pub fn info(&self) -> SyncResult<DatastoreInfo> {
        let route = Route::Datastore {
            store: self.store.clone(),
        };
        self.call(Method::Get, &route, Vec::new())
    }

    /// Returns the last transport error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    /// Returns true until a request fails to get any response.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst) && self.client.is_healthy()
    }

    /// Marks the connection as usable again after a transport failure.
    pub fn reconnect(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }

    fn send(&self, method: Method, route: &Route, body: Vec<u8>) -> SyncResult<HttpResponse> {
        if !self.is_connected() {
            return Err(SyncError::NotConnected);
        }
        let url = join(&self.base_url, &route.path());
        match self.client.send(method, &url, body) {
            Ok(response) => {
                *self.last_error.write() = None;
                Ok(response)
            }
            Err(err) => {
                warn!(url = %url, error = %err, "request failed");
                *self.last_error.write() = Some(err.clone());
                self.connected.store(false, Ordering::SeqCst);
                Err(SyncError::unreachable(err))
            }
        }
    }

    fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        route: &Route,
        body: Vec<u8>,
    ) -> SyncResult<T> {
        let response = self.send(method, route, body)?;
        if !response.is_success() {
            return Err(status_error(&response));
        }
        Ok(decode(&response.body)?)
    }
}

fn status_error(response: &HttpResponse) -> SyncError {
    let message = decode::<ErrorBody>(&response.body)
        .map(|body| body.error)
        .unwrap_or_else(|_| String::from_utf8_lossy(&response.body).into_owned());
    SyncError::status(response.status, message)
}

impl<C: HttpClient> DocumentStore for RemoteDatastore<C> {
    fn id(&self) -> &str {
        &self.id
    }

    fn get(&self, id: &str) -> SyncResult<Option<Document>> {
        let route = Route::Doc {
            store: self.store.clone(),
            id: id.to_string(),
        };
        let response = self.send(Method::Get, &route, Vec::new())?;
        if response.is_success() {
            return Ok(Some(decode(&response.body)?));
        }
        // A 404 for a missing datastore or route is not a missing document.
        let missing = response.status == 404
            && decode::<ErrorBody>(&response.body)
                .is_ok_and(|body| body.is_document_not_found());
        if missing {
            Ok(None)
        } else {
            Err(status_error(&response))
        }
    }

    fn put_if_needed(&self, doc: &Document) -> SyncResult<bool> {
        let route = Route::PutDoc {
            store: self.store.clone(),
        };
        let response: PutResponse = self.call(Method::Post, &route, encode(doc)?)?;
        Ok(response.written())
    }

    fn delete(&self, id: &str) -> SyncResult<bool> {
        let route = Route::Doc {
            store: self.store.clone(),
            id: id.to_string(),
        };
        let response: PutResponse = self.call(Method::Delete, &route, Vec::new())?;
        Ok(response.written())
    }

    fn get_docs_since(&self, since: u64, limit: usize) -> SyncResult<DocsSince> {
        let route = Route::DocsSince {
            store: self.store.clone(),
        };
        let request = DocsSinceRequest {
            start_sequence_id: since,
            chunk_size: limit,
        };
        let response: DocsSinceResponse = self.call(Method::Post, &route, encode(&request)?)?;
        Ok(DocsSince {
            current_sequence_id: response.current_sequence_id,
            documents: response.documents,
        })
    }

    fn peer_sequence_id(&self, peer: &str) -> SyncResult<u64> {
        let route = Route::PeerSequence {
            store: self.store.clone(),
            peer: peer.to_string(),
        };
        let response: PeerSequenceResponse = self.call(Method::Get, &route, Vec::new())?;
        Ok(response.sequence_id)
    }

    fn set_peer_sequence_id(&self, peer: &str, sequence_id: u64) -> SyncResult<()> {
        let route = Route::SetPeerSequence {
            store: self.store.clone(),
            peer: peer.to_string(),
            sequence_id,
        };
        let _: PeerSequenceResponse = self.call(Method::Post, &route, Vec::new())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Replays canned responses and records requests.
    struct TestClient {
        responses: Mutex<VecDeque<Result<HttpResponse, String>>>,
        requests: Mutex<Vec<(Method, String, Vec<u8>)>>,
    }

    impl TestClient {
        fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn respond(self, status: u16, body: &str) -> Self {
            self.responses
                .lock()
                .push_back(Ok(HttpResponse::new(status, body.as_bytes().to_vec())));
            self
        }

        fn fail(self, message: &str) -> Self {
            self.responses.lock().push_back(Err(message.to_string()));
            self
        }
    }

    impl HttpClient for TestClient {
        fn send(&self, method: Method, url: &str, body: Vec<u8>) -> Result<HttpResponse, String> {
            self.requests.lock().push((method, url.to_string(), body));
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err("No response set".into()))
        }
    }

    const INFO: &str = r#"{"name":"notes","id":"remote-id","sequence_id":3}"#;

    #[test]
    fn connect_reads_remote_id() {
        let client = TestClient::new().respond(200, INFO);
        let remote = RemoteDatastore::connect("http://h", "notes", client).unwrap();
        assert_eq!(remote.id(), "remote-id");
        let requests = remote.client.requests.lock();
        assert_eq!(requests[0].0, Method::Get);
        assert_eq!(requests[0].1, "http://h/notes");
    }

    #[test]
    fn connect_or_create_posts() {
        let client = TestClient::new().respond(201, INFO);
        let remote = RemoteDatastore::connect_or_create("http://h", "notes", client).unwrap();
        assert_eq!(remote.client.requests.lock()[0].0, Method::Post);
    }

    #[test]
    fn missing_store_is_status_error() {
        let client = TestClient::new().respond(404, r#"{"error":"no datastore `x`"}"#);
        let err = RemoteDatastore::connect("http://h", "x", client).unwrap_err();
        match err {
            SyncError::Transport {
                status: Some(404),
                message,
            } => assert_eq!(message, "no datastore `x`"),
            other => panic!("expected 404, got {other:?}"),
        }
    }

    #[test]
    fn missing_document_is_none() {
        let client = TestClient::new()
            .respond(200, INFO)
            .respond(
                404,
                r#"{"error":"document not found: A","code":"document_not_found"}"#,
            );
        let remote = RemoteDatastore::connect("http://h", "notes", client).unwrap();
        assert_eq!(remote.get("A").unwrap(), None);
    }

    #[test]
    fn other_not_found_on_get_is_transport_error() {
        let client = TestClient::new()
            .respond(200, INFO)
            .respond(
                404,
                r#"{"error":"unknown datastore: notes","code":"unknown_datastore"}"#,
            )
            .respond(404, r#"{"error":"not found"}"#);
        let remote = RemoteDatastore::connect("http://h", "notes", client).unwrap();

        for _ in 0..2 {
            match remote.get("A") {
                Err(SyncError::Transport {
                    status: Some(404), ..
                }) => {}
                other => panic!("expected 404, got {other:?}"),
            }
        }
    }

    #[test]
    fn docs_since_sends_request_body() {
        let client = TestClient::new().respond(200, INFO).respond(
            200,
            r#"{"current_sequence_id":4,"documents":[{"_id":"A","_rev":4}]}"#,
        );
        let remote = RemoteDatastore::connect("http://h", "notes", client).unwrap();
        let page = remote.get_docs_since(3, 10).unwrap();
        assert_eq!(page.current_sequence_id, 4);
        assert_eq!(page.documents[0].rev(), Some(4));

        let requests = remote.client.requests.lock();
        assert_eq!(requests[1].1, "http://h/notes/docs");
        assert_eq!(
            String::from_utf8(requests[1].2.clone()).unwrap(),
            r#"{"start_sequence_id":3,"chunk_size":10}"#
        );
    }

    #[test]
    fn server_error_body_without_json() {
        let client = TestClient::new().respond(200, INFO).respond(500, "boom");
        let remote = RemoteDatastore::connect("http://h", "notes", client).unwrap();
        let err = remote.peer_sequence_id("p").unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn transport_failure_disconnects() {
        let client = TestClient::new().respond(200, INFO).fail("connection refused");
        let remote = RemoteDatastore::connect("http://h", "notes", client).unwrap();

        let err = remote.put_if_needed(&Document::new("A")).unwrap_err();
        assert!(matches!(err, SyncError::Transport { status: None, .. }));
        assert!(!remote.is_connected());
        assert_eq!(remote.last_error().as_deref(), Some("connection refused"));
        assert!(matches!(remote.get("A"), Err(SyncError::NotConnected)));

        remote.reconnect();
        assert!(remote.is_connected());
    }
}
