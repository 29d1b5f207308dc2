//! Main sync server.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::{HandlerContext, RequestHandler};
use docsync_codec::Document;
use docsync_core::Datastore;
use docsync_sync_protocol::{decode, encode, ErrorBody, Method, Route};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// A response ready to hand to an HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON body.
    pub body: Vec<u8>,
}

impl ServerResponse {
    fn error(err: &ServerError) -> Self {
        let body = encode(&ErrorBody {
            error: err.to_string(),
            code: Some(err.code()),
        })
        .unwrap_or_default();
        Self {
            status: err.status_code(),
            body,
        }
    }
}

/// The sync server.
///
/// Hosts named datastores and answers the remote datastore routes. It does
/// no I/O of its own: an HTTP front end passes each request's method, path
/// and body to [`SyncServer::handle`] and writes back the response.
///
/// # Example
///
/// ```
/// use docsync_sync_protocol::Method;
/// use docsync_sync_server::{ServerConfig, SyncServer};
///
/// let server = SyncServer::new(ServerConfig::default());
/// let created = server.handle(Method::Post, "/notes", b"");
/// assert_eq!(created.status, 201);
///
/// let put = server.handle(Method::Post, "/notes/doc", br#"{"_id":"A","value":"v1"}"#);
/// assert_eq!(put.body, br#"{"num_docs_put":1}"#);
/// ```
pub struct SyncServer {
    handler: RequestHandler,
    context: Arc<HandlerContext>,
}

impl SyncServer {
    /// Creates a new sync server with no datastores.
    pub fn new(config: ServerConfig) -> Self {
        let context = Arc::new(HandlerContext::new(config));
        let handler = RequestHandler::new(Arc::clone(&context));

        Self { handler, context }
    }

    /// Creates a sync server and opens the journals in its data directory.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if a journal cannot be opened.
    pub fn open(config: ServerConfig) -> ServerResult<Self> {
        let server = Self::new(config);
        server.context.load_existing()?;
        Ok(server)
    }

    /// Hosts an already open datastore under `name`.
    pub fn insert_datastore(&self, name: &str, store: Arc<Datastore>) -> ServerResult<()> {
        self.context.insert_store(name, store)
    }

    /// Returns a hosted datastore.
    pub fn datastore(&self, name: &str) -> ServerResult<Arc<Datastore>> {
        self.context.store(name)
    }

    /// Route names of hosted datastores.
    pub fn datastore_names(&self) -> Vec<String> {
        self.context.names()
    }

    /// The server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.context.config
    }

    /// Handles one request.
    ///
    /// Never fails: errors become a JSON `{"error": ...}` body with the
    /// matching status code.
    pub fn handle(&self, method: Method, path: &str, body: &[u8]) -> ServerResponse {
        match self.dispatch(method, path, body) {
            Ok((status, body)) => {
                debug!(method = %method, path = %path, status, "request handled");
                ServerResponse { status, body }
            }
            Err(err) => {
                if err.is_server_error() {
                    warn!(method = %method, path = %path, error = %err, "request failed");
                } else {
                    debug!(method = %method, path = %path, error = %err, "request refused");
                }
                ServerResponse::error(&err)
            }
        }
    }

    fn dispatch(&self, method: Method, path: &str, body: &[u8]) -> ServerResult<(u16, Vec<u8>)> {
        let route = Route::parse(path)?;
        let h = &self.handler;
        match (method, route) {
            (Method::Get, Route::Root) => ok(&h.handle_list()),
            (Method::Get, Route::Datastore { store }) => ok(&h.handle_info(&store)?),
            (Method::Post, Route::Datastore { store }) => {
                let (info, created) = h.handle_create(&store)?;
                let status = if created { 201 } else { 200 };
                Ok((status, encode(&info)?))
            }
            (Method::Get, Route::Doc { store, id }) => ok(&h.handle_get_doc(&store, &id)?),
            (Method::Delete, Route::Doc { store, id }) => ok(&h.handle_delete_doc(&store, &id)?),
            (Method::Post, Route::PutDoc { store }) => {
                let doc: Document = decode(body)?;
                let increment_rev = query_flag(path, "increment_rev");
                ok(&h.handle_put_doc(&store, &doc, increment_rev)?)
            }
            (Method::Post, Route::DocsSince { store }) => {
                ok(&h.handle_docs_since(&store, decode(body)?)?)
            }
            (Method::Get, Route::PeerSequence { store, peer }) => {
                ok(&h.handle_peer_sequence(&store, &peer)?)
            }
            (
                Method::Post,
                Route::SetPeerSequence {
                    store,
                    peer,
                    sequence_id,
                },
            ) => ok(&h.handle_set_peer_sequence(&store, &peer, sequence_id)?),
            (method, _) => Err(ServerError::MethodNotAllowed {
                method: method.to_string(),
                path: path.to_string(),
            }),
        }
    }
}

fn ok<T: Serialize>(message: &T) -> ServerResult<(u16, Vec<u8>)> {
    Ok((200, encode(message)?))
}

/// Returns true if the query string sets `name` to `true` (any case) or `1`.
fn query_flag(path: &str, name: &str) -> bool {
    let Some((_, query)) = path.split_once('?') else {
        return false;
    };
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .any(|(key, value)| key == name && (value.eq_ignore_ascii_case("true") || value == "1"))
}
