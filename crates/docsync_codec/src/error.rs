//! Error types for the codec crate.

use crate::value::ValueKind;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while building, encoding or decoding documents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to encode a document to JSON.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode JSON input.
    #[error("decoding failed: {message}")]
    DecodingFailed {
        /// Description of the decoding error.
        message: String,
    },

    /// The document has no `_id` field.
    #[error("document is missing the `_id` field")]
    MissingId,

    /// A reserved field holds a value of the wrong kind.
    #[error("reserved field `{field}` must be {expected}, got {found}")]
    InvalidReservedField {
        /// The reserved key (`_id`, `_rev` or `_deleted`).
        field: String,
        /// What the field must hold.
        expected: &'static str,
        /// What it actually held.
        found: ValueKind,
    },

    /// A revision does not fit the signed 64-bit wire integer.
    #[error("revision {rev} is out of range")]
    RevisionOverflow {
        /// The rejected revision.
        rev: u64,
    },

    /// A field value is not one of the supported scalar kinds.
    #[error("unsupported value for field `{field}`: {type_name}")]
    UnsupportedType {
        /// Key of the offending field.
        field: String,
        /// Name of the unsupported JSON type.
        type_name: String,
    },
}

impl CodecError {
    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Create a decoding failed error.
    pub fn decoding_failed(message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            message: message.into(),
        }
    }

    /// Create an unsupported type error.
    pub fn unsupported_type(field: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            field: field.into(),
            type_name: type_name.into(),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::decoding_failed(err.to_string())
    }
}

/// Two documents hold values of different scalar kinds under the same key,
/// so they have no defined order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot compare field `{key}`: {left} vs {right}")]
pub struct ComparisonError {
    /// The key whose values could not be ordered.
    pub key: String,
    /// Kind of the value in the left-hand document.
    pub left: ValueKind,
    /// Kind of the value in the right-hand document.
    pub right: ValueKind,
}
