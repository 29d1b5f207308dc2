//! JSON message bodies.

use crate::error::ProtocolResult;
use docsync_codec::Document;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Body of `POST /{datastore}/docs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsSinceRequest {
    /// Return documents with `_rev` above this value.
    pub start_sequence_id: u64,
    /// Page size requested by the client.
    pub chunk_size: usize,
}

/// Response to [`DocsSinceRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsSinceResponse {
    /// The serving store's sequence id when the page was read.
    pub current_sequence_id: u64,
    /// Documents in ascending `_rev` order.
    pub documents: Vec<Document>,
}

/// Response to document writes and deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutResponse {
    /// 1 if a document was written, else 0.
    pub num_docs_put: u32,
}

impl PutResponse {
    /// Builds a response from a write outcome.
    pub fn from_written(written: bool) -> Self {
        Self {
            num_docs_put: u32::from(written),
        }
    }

    /// Returns true if a document was written.
    pub fn written(&self) -> bool {
        self.num_docs_put > 0
    }
}

/// Response to `GET /{datastore}/sequence_id/{peer}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSequenceResponse {
    /// Last sequence number consumed from the peer.
    pub sequence_id: u64,
}

/// Response to `GET /{datastore}` and `POST /{datastore}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatastoreInfo {
    /// Route name of the datastore.
    pub name: String,
    /// Datastore id announced to peers.
    pub id: String,
    /// Current sequence id.
    pub sequence_id: u64,
}

/// Response to `GET /`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatastoreList {
    /// Route names of hosted datastores, sorted.
    pub datastores: Vec<String>,
}

/// Machine-readable class of an error response.
///
/// Several classes share a status code: a 404 may mean a missing document,
/// a missing datastore or an unknown route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// No datastore is hosted under the requested name.
    UnknownDatastore,
    /// The path names no route.
    UnknownRoute,
    /// The datastore holds no document with the requested id.
    DocumentNotFound,
    /// The route exists but not for the request method.
    MethodNotAllowed,
    /// The datastore name cannot be hosted.
    InvalidName,
    /// The request body or path could not be parsed.
    InvalidRequest,
    /// The datastore refused a well-formed request.
    Unprocessable,
    /// The server failed.
    Internal,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
    /// Error class, absent from servers that do not send one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl ErrorBody {
    /// Returns true if the body reports a missing document.
    pub fn is_document_not_found(&self) -> bool {
        self.code == Some(ErrorCode::DocumentNotFound)
    }
}

/// Encodes a message as JSON bytes.
pub fn encode<T: Serialize>(message: &T) -> ProtocolResult<Vec<u8>> {
    Ok(serde_json::to_vec(message)?)
}

/// Decodes a message from JSON bytes.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> ProtocolResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;

    #[test]
    fn docs_since_request_field_names() {
        let bytes = encode(&DocsSinceRequest {
            start_sequence_id: 3,
            chunk_size: 10,
        })
        .unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"start_sequence_id":3,"chunk_size":10}"#
        );
    }

    #[test]
    fn docs_since_response_carries_documents() {
        let body = br#"{"current_sequence_id":5,"documents":[{"_id":"A","_rev":1,"value":"v1"}]}"#;
        let response: DocsSinceResponse = decode(body).unwrap();
        assert_eq!(response.current_sequence_id, 5);
        assert_eq!(response.documents[0].id(), "A");
        assert_eq!(response.documents[0].rev(), Some(1));
    }

    #[test]
    fn invalid_document_in_page_is_malformed() {
        let body = br#"{"current_sequence_id":5,"documents":[{"_id":"A","x":1.5}]}"#;
        let result: ProtocolResult<DocsSinceResponse> = decode(body);
        assert!(matches!(result, Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn error_body_code_is_optional() {
        let bytes = encode(&ErrorBody {
            error: "document not found: A".into(),
            code: Some(ErrorCode::DocumentNotFound),
        })
        .unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"error":"document not found: A","code":"document_not_found"}"#
        );

        let bare: ErrorBody = decode(br#"{"error":"not found"}"#).unwrap();
        assert_eq!(bare.code, None);
        assert!(!bare.is_document_not_found());
    }

    #[test]
    fn put_response_flags() {
        assert!(PutResponse::from_written(true).written());
        assert_eq!(PutResponse::from_written(false).num_docs_put, 0);
        let decoded: PutResponse = decode(br#"{"num_docs_put":1}"#).unwrap();
        assert!(decoded.written());
    }
}
