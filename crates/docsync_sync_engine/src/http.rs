//! HTTP client abstraction.
//!
//! The sync engine does not pick an HTTP library. [`RemoteDatastore`]
//! talks through the [`HttpClient`] trait, so any blocking client (ureq,
//! reqwest's blocking API, a test double) can carry the requests.
//!
//! [`RemoteDatastore`]: crate::RemoteDatastore

use docsync_sync_protocol::Method;

/// A response as seen by the sync engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
///
/// `Err` means no response arrived at all. Any response, whatever its
/// status, is `Ok`.
pub trait HttpClient: Send + Sync {
    /// Sends a request and returns the response.
    fn send(&self, method: Method, url: &str, body: Vec<u8>) -> Result<HttpResponse, String>;

    /// Checks if the client is connected/healthy.
    fn is_healthy(&self) -> bool {
        true
    }
}

/// Trait for servers that can handle loopback requests.
pub trait LoopbackServer {
    /// Handles a request for `path` and returns the response.
    fn handle(&self, method: Method, path: &str, body: &[u8]) -> HttpResponse;
}

/// A loopback HTTP client that routes requests directly to a server.
///
/// Useful for testing without actual network overhead.
pub struct LoopbackClient<S: LoopbackServer> {
    server: S,
}

impl<S: LoopbackServer + Send + Sync> LoopbackClient<S> {
    /// Creates a new loopback client connected to the given server.
    pub fn new(server: S) -> Self {
        Self { server }
    }

    /// The server requests are routed to.
    pub fn server(&self) -> &S {
        &self.server
    }
}

impl<S: LoopbackServer + Send + Sync> HttpClient for LoopbackClient<S> {
    fn send(&self, method: Method, url: &str, body: Vec<u8>) -> Result<HttpResponse, String> {
        Ok(self.server.handle(method, path_of(url), &body))
    }
}

/// Strips scheme and authority from `url`, leaving the path.
pub(crate) fn path_of(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(i) => &url[i + 3..],
        None => return url,
    };
    match rest.find('/') {
        Some(i) => &rest[i..],
        None => "/",
    }
}

/// Joins a base URL and a route path without doubling the slash.
pub(crate) fn join(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
