//! JSON wire form of documents.
//!
//! A document travels as a flat JSON object. Every member must be null, a
//! boolean, an integer that fits in `i64`, or a string; anything else is
//! rejected with [`CodecError::UnsupportedType`].

use crate::document::Document;
use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use serde_json::Value as Json;
use std::collections::BTreeMap;

/// Encodes a document as a compact JSON string with sorted keys.
pub fn to_json(doc: &Document) -> CodecResult<String> {
    serde_json::to_string(doc).map_err(|e| CodecError::encoding_failed(e.to_string()))
}

/// Encodes a document as a JSON byte vector.
pub fn to_json_vec(doc: &Document) -> CodecResult<Vec<u8>> {
    serde_json::to_vec(doc).map_err(|e| CodecError::encoding_failed(e.to_string()))
}

/// Converts a document into a `serde_json::Value` object.
pub fn to_json_value(doc: &Document) -> Json {
    let object = doc
        .iter()
        .map(|(key, value)| (key.to_string(), scalar_to_json(value)))
        .collect();
    Json::Object(object)
}

/// Decodes a document from a JSON string.
pub fn from_json(input: &str) -> CodecResult<Document> {
    let raw: Json = serde_json::from_str(input)?;
    from_json_value(raw)
}

/// Decodes a document from JSON bytes.
pub fn from_json_slice(input: &[u8]) -> CodecResult<Document> {
    let raw: Json = serde_json::from_slice(input)?;
    from_json_value(raw)
}

/// Converts a parsed JSON object into a document.
pub fn from_json_value(raw: Json) -> CodecResult<Document> {
    let Json::Object(object) = raw else {
        return Err(CodecError::decoding_failed(format!(
            "expected a JSON object, got {}",
            json_type_name(&raw)
        )));
    };

    let mut fields = BTreeMap::new();
    for (key, value) in object {
        let value = scalar_from_json(&key, value)?;
        fields.insert(key, value);
    }
    Document::from_fields(fields)
}

fn scalar_from_json(key: &str, value: Json) -> CodecResult<Value> {
    match value {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(b)),
        Json::Number(n) => n.as_i64().map(Value::Integer).ok_or_else(|| {
            let kind = if n.is_f64() { "float" } else { "out-of-range integer" };
            CodecError::unsupported_type(key, kind)
        }),
        Json::String(s) => Ok(Value::Text(s)),
        other => Err(CodecError::unsupported_type(key, json_type_name(&other))),
    }
}

fn scalar_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Integer(n) => Json::from(*n),
        Value::Text(s) => Json::String(s.clone()),
    }
}

fn json_type_name(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
