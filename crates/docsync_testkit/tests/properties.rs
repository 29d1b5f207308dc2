//! Property tests for the comparator, the datastore and replication.

use docsync_sync_engine::{sync, Replicator, SyncConfig};
use docsync_testkit::prelude::*;
use proptest::prelude::*;
use std::cmp::Ordering;

proptest! {
    #![proptest_config(PropTestConfig::default().to_proptest_config())]

    #[test]
    fn compare_is_reflexive(doc in document_strategy()) {
        prop_assert_eq!(doc.compare(&doc).unwrap(), Ordering::Equal);
    }

    #[test]
    fn compare_is_antisymmetric(a in document_strategy(), b in document_strategy()) {
        let ab = a.compare(&b).unwrap();
        let ba = b.compare(&a).unwrap();
        prop_assert_eq!(ab, ba.reverse());
        if ab == Ordering::Equal {
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn compare_is_transitive(
        a in document_strategy(),
        b in document_strategy(),
        c in document_strategy(),
    ) {
        let mut docs = [a, b, c];
        docs.sort_by(|x, y| x.compare(y).unwrap());
        prop_assert_ne!(docs[0].compare(&docs[2]).unwrap(), Ordering::Greater);
    }
}

proptest! {
    #![proptest_config(PropTestConfig::quick().to_proptest_config())]

    #[test]
    fn put_if_needed_is_idempotent(
        setup in operation_sequence_strategy(0, 10),
        doc in revisioned_document_strategy(6),
    ) {
        let store = TestStore::memory("idem");
        for op in &setup {
            apply(&store, op).unwrap();
        }
        store.put_if_needed(&doc).unwrap();
        let sequence_id = store.sequence_id();
        let stored = store.get(doc.id()).unwrap();

        prop_assert!(!store.put_if_needed(&doc).unwrap());
        prop_assert_eq!(store.sequence_id(), sequence_id);
        prop_assert_eq!(store.get(doc.id()).unwrap(), stored);
    }

    #[test]
    fn sequence_id_never_decreases(ops in operation_sequence_strategy(1, 40)) {
        let store = TestStore::memory("mono");
        let mut last = store.sequence_id();
        for op in &ops {
            let wrote = apply(&store, op).unwrap();
            let now = store.sequence_id();
            prop_assert!(now >= last);
            if !wrote {
                prop_assert_eq!(now, last);
            }
            last = now;
        }
        prop_assert!(store.check().unwrap().is_ok());
    }

    #[test]
    fn every_stored_document_beats_what_it_replaced(ops in operation_sequence_strategy(1, 30)) {
        let store = TestStore::memory("winner");
        for op in &ops {
            let before = match op {
                StoreOperation::Put { doc } | StoreOperation::Edit { doc } => {
                    store.get(doc.id()).unwrap()
                }
                StoreOperation::Delete { id } => store.get(id).unwrap(),
            };
            apply(&store, op).unwrap();
            if let Some(before) = before {
                let after = store.get(before.id()).unwrap().unwrap();
                prop_assert!(after.rev() >= before.rev());
                if after.rev() == before.rev() {
                    prop_assert_ne!(after.compare(&before).unwrap(), Ordering::Less);
                }
            }
        }
    }

    #[test]
    fn two_stores_converge_after_sync(
        ops_a in operation_sequence_strategy(0, 20),
        ops_b in operation_sequence_strategy(0, 20),
        page_size in 1usize..5,
    ) {
        let a = TestStore::memory("a");
        let b = TestStore::memory("b");
        for op in &ops_a {
            apply(&a, op).unwrap();
        }
        for op in &ops_b {
            apply(&b, op).unwrap();
        }

        Replicator::new(SyncConfig::new().with_page_size(page_size))
            .sync(&*a, &*b)
            .unwrap();
        assert_converged(&*a, &*b);

        let again = sync(&*a, &*b).unwrap();
        prop_assert_eq!(again.documents_written(), 0);
    }
}
