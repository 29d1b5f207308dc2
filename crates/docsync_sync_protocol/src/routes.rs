//! Request routes shared by the remote client and the server.
//!
//! Every route lives under a datastore name:
//!
//! ```text
//! GET    /                                    list datastores
//! GET    /{store}                             datastore info
//! POST   /{store}                             create datastore
//! GET    /{store}/doc/{id}                    read document
//! DELETE /{store}/doc/{id}                    delete document
//! POST   /{store}/doc                         put document
//! POST   /{store}/docs                        page of changes
//! GET    /{store}/sequence_id/{peer}          read peer cursor
//! POST   /{store}/sequence_id/{peer}/{seq}    advance peer cursor
//! ```
//!
//! Path segments are percent-encoded, so ids may contain `/`.

use crate::error::{ProtocolError, ProtocolResult};
use std::fmt;
use std::str::FromStr;

/// HTTP methods used by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// DELETE
    Delete,
}

impl Method {
    /// The method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "DELETE" => Ok(Method::Delete),
            _ => Err(ProtocolError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// A parsed request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Root,
    /// `/{store}`
    Datastore {
        /// Datastore name.
        store: String,
    },
    /// `/{store}/doc/{id}`
    Doc {
        /// Datastore name.
        store: String,
        /// Document id.
        id: String,
    },
    /// `/{store}/doc`
    PutDoc {
        /// Datastore name.
        store: String,
    },
    /// `/{store}/docs`
    DocsSince {
        /// Datastore name.
        store: String,
    },
    /// `/{store}/sequence_id/{peer}`
    PeerSequence {
        /// Datastore name.
        store: String,
        /// Peer datastore id.
        peer: String,
    },
    /// `/{store}/sequence_id/{peer}/{seq}`
    SetPeerSequence {
        /// Datastore name.
        store: String,
        /// Peer datastore id.
        peer: String,
        /// New cursor value.
        sequence_id: u64,
    },
}

impl Route {
    /// Parses a request path. A query string, if any, is ignored.
    pub fn parse(path: &str) -> ProtocolResult<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(decode_segment)
            .collect::<ProtocolResult<Vec<_>>>()?;

        let unknown = || ProtocolError::UnknownRoute(path.to_string());
        let route = match segments.as_slice() {
            [] => Route::Root,
            [store] => Route::Datastore {
                store: store.clone(),
            },
            [store, doc] if doc == "doc" => Route::PutDoc {
                store: store.clone(),
            },
            [store, docs] if docs == "docs" => Route::DocsSince {
                store: store.clone(),
            },
            [store, doc, id] if doc == "doc" => Route::Doc {
                store: store.clone(),
                id: id.clone(),
            },
            [store, seq, peer] if seq == "sequence_id" => Route::PeerSequence {
                store: store.clone(),
                peer: peer.clone(),
            },
            [store, seq, peer, value] if seq == "sequence_id" => Route::SetPeerSequence {
                store: store.clone(),
                peer: peer.clone(),
                sequence_id: value.parse().map_err(|_| unknown())?,
            },
            _ => return Err(unknown()),
        };
        Ok(route)
    }

    /// Builds the request path for this route.
    pub fn path(&self) -> String {
        match self {
            Route::Root => "/".to_string(),
            Route::Datastore { store } => format!("/{}", encode_segment(store)),
            Route::Doc { store, id } => {
                format!("/{}/doc/{}", encode_segment(store), encode_segment(id))
            }
            Route::PutDoc { store } => format!("/{}/doc", encode_segment(store)),
            Route::DocsSince { store } => format!("/{}/docs", encode_segment(store)),
            Route::PeerSequence { store, peer } => format!(
                "/{}/sequence_id/{}",
                encode_segment(store),
                encode_segment(peer)
            ),
            Route::SetPeerSequence {
                store,
                peer,
                sequence_id,
            } => format!(
                "/{}/sequence_id/{}/{sequence_id}",
                encode_segment(store),
                encode_segment(peer)
            ),
        }
    }

    /// The datastore this route addresses, if any.
    pub fn store(&self) -> Option<&str> {
        match self {
            Route::Root => None,
            Route::Datastore { store }
            | Route::Doc { store, .. }
            | Route::PutDoc { store }
            | Route::DocsSince { store }
            | Route::PeerSequence { store, .. }
            | Route::SetPeerSequence { store, .. } => Some(store),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
pub fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Decodes a percent-encoded path segment.
pub fn decode_segment(segment: &str) -> ProtocolResult<String> {
    let bad = || ProtocolError::UnknownRoute(format!("bad path segment `{segment}`"));
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3).ok_or_else(bad)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return Err(bad());
            }
            let hex = std::str::from_utf8(hex).map_err(|_| bad())?;
            out.push(u8::from_str_radix(hex, 16).map_err(|_| bad())?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| bad())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_route() {
        assert_eq!(Route::parse("/").unwrap(), Route::Root);
        assert_eq!(
            Route::parse("/notes").unwrap(),
            Route::Datastore {
                store: "notes".into()
            }
        );
        assert_eq!(
            Route::parse("/notes/doc").unwrap(),
            Route::PutDoc {
                store: "notes".into()
            }
        );
        assert_eq!(
            Route::parse("/notes/docs").unwrap(),
            Route::DocsSince {
                store: "notes".into()
            }
        );
        assert_eq!(
            Route::parse("/notes/doc/A").unwrap(),
            Route::Doc {
                store: "notes".into(),
                id: "A".into()
            }
        );
        assert_eq!(
            Route::parse("/notes/sequence_id/peer").unwrap(),
            Route::PeerSequence {
                store: "notes".into(),
                peer: "peer".into()
            }
        );
        assert_eq!(
            Route::parse("/notes/sequence_id/peer/12").unwrap(),
            Route::SetPeerSequence {
                store: "notes".into(),
                peer: "peer".into(),
                sequence_id: 12
            }
        );
    }

    #[test]
    fn rejects_unknown_paths() {
        assert!(Route::parse("/notes/other").is_err());
        assert!(Route::parse("/notes/sequence_id/peer/x").is_err());
        assert!(Route::parse("/notes/doc/a/b").is_err());
    }

    #[test]
    fn ids_with_slashes_survive() {
        let route = Route::Doc {
            store: "notes".into(),
            id: "a/b c%".into(),
        };
        let path = route.path();
        assert_eq!(path, "/notes/doc/a%2Fb%20c%25");
        assert_eq!(Route::parse(&path).unwrap(), route);
    }

    #[test]
    fn query_string_is_ignored() {
        assert_eq!(
            Route::parse("/notes/docs?x=1").unwrap(),
            Route::DocsSince {
                store: "notes".into()
            }
        );
    }

    #[test]
    fn bad_escapes_fail() {
        assert!(decode_segment("%zz").is_err());
        assert!(decode_segment("%4").is_err());
        assert!(decode_segment("%FF").is_err());
        // Only two hex digits form an escape, never a signed number.
        assert!(decode_segment("%+1").is_err());
        assert!(decode_segment("a%+Fb").is_err());
        assert!(Route::parse("/notes/doc/%+1").is_err());
    }

    #[test]
    fn methods() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert!("PATCH".parse::<Method>().is_err());
    }
}
