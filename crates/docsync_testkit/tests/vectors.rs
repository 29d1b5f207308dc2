//! Runs the shared comparator and wire vectors.

use docsync_codec::json::{from_json, to_json};
use docsync_testkit::{compare_vectors, wire_vectors, CompareOutcome};

#[test]
fn comparator_vectors() {
    for vector in compare_vectors() {
        let left = from_json(&vector.left).unwrap();
        let right = from_json(&vector.right).unwrap();
        let outcome = left
            .compare(&right)
            .map(CompareOutcome::from)
            .unwrap_or(CompareOutcome::Error);
        assert_eq!(outcome, vector.expected, "vector {}", vector.id);

        let reversed = right
            .compare(&left)
            .map(|o| CompareOutcome::from(o.reverse()))
            .unwrap_or(CompareOutcome::Error);
        assert_eq!(reversed, vector.expected, "vector {} reversed", vector.id);
    }
}

#[test]
fn wire_vectors_decode_as_expected() {
    for vector in wire_vectors() {
        let decoded = from_json(&vector.input);
        match &vector.canonical {
            Some(canonical) => {
                let doc = decoded.unwrap_or_else(|e| panic!("vector {}: {e}", vector.id));
                assert_eq!(&to_json(&doc).unwrap(), canonical, "vector {}", vector.id);
            }
            None => assert!(decoded.is_err(), "vector {} should be rejected", vector.id),
        }
    }
}
