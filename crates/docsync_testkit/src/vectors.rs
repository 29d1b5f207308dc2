//! Shared vectors for the comparator and the JSON wire form.
//!
//! Every replica must order documents identically and accept the same wire
//! documents, or replicas stop converging. These vectors pin both.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Expected outcome of comparing two documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOutcome {
    /// `left` sorts first.
    Less,
    /// The documents are equal.
    Equal,
    /// `right` sorts first.
    Greater,
    /// The documents cannot be ordered.
    Error,
}

impl From<Ordering> for CompareOutcome {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => CompareOutcome::Less,
            Ordering::Equal => CompareOutcome::Equal,
            Ordering::Greater => CompareOutcome::Greater,
        }
    }
}

/// Two wire documents and how they compare.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Left document as JSON.
    pub left: String,
    /// Right document as JSON.
    pub right: String,
    /// Expected result of `left.compare(right)`.
    pub expected: CompareOutcome,
}

/// A wire document and whether it decodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Input JSON.
    pub input: String,
    /// Re-encoded form, or `None` if decoding must fail.
    pub canonical: Option<String>,
}

fn compare(id: &str, left: &str, right: &str, expected: CompareOutcome) -> CompareVector {
    CompareVector {
        id: id.into(),
        left: left.into(),
        right: right.into(),
        expected,
    }
}

fn wire(id: &str, input: &str, canonical: Option<&str>) -> WireVector {
    WireVector {
        id: id.into(),
        input: input.into(),
        canonical: canonical.map(Into::into),
    }
}

/// Comparator vectors.
pub fn compare_vectors() -> Vec<CompareVector> {
    use CompareOutcome::*;
    vec![
        compare(
            "identical",
            r#"{"_id":"A","_rev":1,"value":"v1"}"#,
            r#"{"_id":"A","_rev":1,"value":"v1"}"#,
            Equal,
        ),
        compare(
            "fewer_fields_first",
            r#"{"_id":"A","_rev":1}"#,
            r#"{"_id":"A","_rev":1,"value":"v1"}"#,
            Less,
        ),
        compare(
            "keys_before_values",
            r#"{"_id":"A","_rev":1,"b":0}"#,
            r#"{"_id":"A","_rev":1,"a":9}"#,
            Greater,
        ),
        compare(
            "tombstone_key_sorts_first",
            r#"{"_deleted":true,"_id":"A","_rev":2}"#,
            r#"{"_id":"A","_rev":2,"value":"v"}"#,
            Less,
        ),
        compare(
            "text_values",
            r#"{"_id":"B","_rev":1,"value":"v1"}"#,
            r#"{"_id":"B","_rev":1,"value":"v2"}"#,
            Less,
        ),
        compare(
            "text_is_byte_order",
            r#"{"_id":"A","t":"a"}"#,
            r#"{"_id":"A","t":"Z"}"#,
            Greater,
        ),
        compare(
            "null_sorts_first",
            r#"{"_id":"A","x":null}"#,
            r#"{"_id":"A","x":0}"#,
            Less,
        ),
        compare(
            "false_before_true",
            r#"{"_id":"A","x":false}"#,
            r#"{"_id":"A","x":true}"#,
            Less,
        ),
        compare(
            "negative_integers",
            r#"{"_id":"A","x":-5}"#,
            r#"{"_id":"A","x":3}"#,
            Less,
        ),
        compare(
            "id_is_a_field",
            r#"{"_id":"B","_rev":1}"#,
            r#"{"_id":"A","_rev":1}"#,
            Greater,
        ),
        compare(
            "revision_is_a_field",
            r#"{"_id":"A","_rev":2}"#,
            r#"{"_id":"A","_rev":10}"#,
            Less,
        ),
        compare(
            "mixed_kinds",
            r#"{"_id":"A","x":1}"#,
            r#"{"_id":"A","x":"1"}"#,
            Error,
        ),
        compare(
            "first_difference_decides",
            r#"{"_id":"A","a":1,"b":"x"}"#,
            r#"{"_id":"A","a":2,"b":false}"#,
            Less,
        ),
    ]
}

/// Wire-format vectors.
pub fn wire_vectors() -> Vec<WireVector> {
    vec![
        wire(
            "all_kinds",
            r#"{"z":null,"t":"x","n":-2,"b":true,"_rev":3,"_id":"A"}"#,
            Some(r#"{"_id":"A","_rev":3,"b":true,"n":-2,"t":"x","z":null}"#),
        ),
        wire("no_rev", r#"{"_id":"A"}"#, Some(r#"{"_id":"A"}"#)),
        wire(
            "tombstone",
            r#"{"_id":"A","_rev":2,"_deleted":true}"#,
            Some(r#"{"_deleted":true,"_id":"A","_rev":2}"#),
        ),
        wire("float", r#"{"_id":"A","x":1.5}"#, None),
        wire("array", r#"{"_id":"A","x":[1]}"#, None),
        wire("object", r#"{"_id":"A","x":{"y":1}}"#, None),
        wire("huge_integer", r#"{"_id":"A","x":18446744073709551615}"#, None),
        wire("missing_id", r#"{"x":1}"#, None),
        wire("numeric_id", r#"{"_id":7}"#, None),
        wire("negative_rev", r#"{"_id":"A","_rev":-1}"#, None),
        wire("text_rev", r#"{"_id":"A","_rev":"1"}"#, None),
        wire("text_deleted", r#"{"_id":"A","_deleted":"yes"}"#, None),
        wire("not_an_object", r#"["A"]"#, None),
    ]
}
