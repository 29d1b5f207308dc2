//! Property-based test generators using proptest.
//!
//! Field names carry their kind (`b_*` booleans, `i_*` integers, `t_*`
//! text), so two generated documents never hold different non-null kinds
//! under one key and can always be compared.

use docsync_codec::{Document, Value};
use proptest::prelude::*;

/// Strategy for generating any scalar value.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::Text),
    ]
}

/// Strategy for a field name and a value of the kind the name announces.
///
/// Values are drawn from small ranges so that ties are common.
pub fn typed_field_strategy() -> impl Strategy<Value = (String, Value)> {
    let null_or = |v: BoxedStrategy<Value>| prop_oneof![1 => Just(Value::Null), 4 => v];
    prop_oneof![
        ("b_[a-c]", null_or(any::<bool>().prop_map(Value::Bool).boxed())),
        ("i_[a-c]", null_or((-3i64..3).prop_map(Value::Integer).boxed())),
        ("t_[a-c]", null_or("[ab]{0,2}".prop_map(Value::Text).boxed())),
    ]
}

/// Strategy for document ids drawn from a small pool, so ids collide.
pub fn doc_id_strategy() -> impl Strategy<Value = String> {
    "[A-E]"
}

/// Strategy for documents with no `_rev`.
pub fn document_strategy() -> impl Strategy<Value = Document> {
    (
        doc_id_strategy(),
        prop::collection::vec(typed_field_strategy(), 0..4),
        prop::bool::weighted(0.1),
    )
        .prop_map(|(id, fields, deleted)| {
            let mut doc = Document::new(id);
            for (key, value) in fields {
                doc.set(key, value).expect("generated keys are not reserved");
            }
            doc.set_deleted(deleted);
            doc
        })
}

/// Strategy for documents carrying a `_rev` in `1..=max_rev`.
pub fn revisioned_document_strategy(max_rev: u64) -> impl Strategy<Value = Document> {
    (document_strategy(), 1..=max_rev.max(1)).prop_map(|(mut doc, rev)| {
        doc.set_rev(rev).expect("small revisions fit");
        doc
    })
}

/// One mutating call on a datastore.
#[derive(Debug, Clone)]
pub enum StoreOperation {
    /// `put_if_needed` with the document as generated.
    Put {
        /// The document.
        doc: Document,
    },
    /// `put_with_new_rev`.
    Edit {
        /// The document.
        doc: Document,
    },
    /// `delete`.
    Delete {
        /// Document id.
        id: String,
    },
}

/// Strategy for generating store operations.
pub fn store_operation_strategy() -> impl Strategy<Value = StoreOperation> {
    prop_oneof![
        3 => revisioned_document_strategy(4).prop_map(|doc| StoreOperation::Put { doc }),
        2 => document_strategy().prop_map(|doc| StoreOperation::Put { doc }),
        2 => document_strategy().prop_map(|doc| StoreOperation::Edit { doc }),
        1 => doc_id_strategy().prop_map(|id| StoreOperation::Delete { id }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<StoreOperation>> {
    prop::collection::vec(store_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn typed_fields_match_their_prefix((key, value) in typed_field_strategy()) {
            let ok = match &value {
                Value::Null => true,
                Value::Bool(_) => key.starts_with("b_"),
                Value::Integer(_) => key.starts_with("i_"),
                Value::Text(_) => key.starts_with("t_"),
            };
            prop_assert!(ok, "{key} holds {value:?}");
        }

        #[test]
        fn generated_documents_always_compare(a in document_strategy(), b in document_strategy()) {
            prop_assert!(a.compare(&b).is_ok());
        }

        #[test]
        fn revisioned_documents_have_rev(doc in revisioned_document_strategy(3)) {
            let rev = doc.rev().unwrap();
            prop_assert!((1..=3).contains(&rev));
        }
    }
}
