//! End-to-end replication scenarios, run against local and hosted stores.

use docsync_codec::{Document, Value};
use docsync_sync_engine::{pull, sync, DocumentStore};
use docsync_sync_server::ServerConfig;
use docsync_testkit::prelude::*;
use std::cmp::Ordering;

#[test]
fn first_put_without_rev_is_stamped() {
    let store = TestStore::memory("s");
    assert!(store.put_if_needed(&doc("A", "v1")).unwrap());
    assert_eq!(store.get("A").unwrap().unwrap().rev(), Some(1));
    assert_eq!(store.sequence_id(), 1);
}

#[test]
fn repeated_put_without_rev_is_ignored() {
    let store = TestStore::memory("s");
    store.put_if_needed(&doc("A", "v1")).unwrap();
    let before = store.get("A").unwrap();

    assert!(!store.put_if_needed(&doc("A", "v1")).unwrap());
    assert!(!store.put_if_needed(&doc("A", "v2")).unwrap());
    assert_eq!(store.get("A").unwrap(), before);
    assert_eq!(store.sequence_id(), 1);

    // Echoing the observed revision with a greater body does land.
    assert!(store.put_if_needed(&doc_with_rev("A", 1, "v2")).unwrap());
    assert_eq!(store.sequence_id(), 1);
}

#[test]
fn identical_tie_is_a_no_op() {
    let store = TestStore::memory("s");
    store.put_if_needed(&doc("A", "v1")).unwrap();
    assert!(!store.put_if_needed(&doc_with_rev("A", 1, "v1")).unwrap());
    assert_eq!(store.stats().ignored_puts(), 1);
}

#[test]
fn concurrent_creates_resolve_to_the_greater_document() {
    let s1 = TestStore::memory("s1");
    let s2 = TestStore::memory("s2");
    s1.put_if_needed(&doc("B", "from s1")).unwrap();
    s2.put_if_needed(&doc("B", "from s2")).unwrap();

    let v1 = s1.get("B").unwrap().unwrap();
    let v2 = s2.get("B").unwrap().unwrap();
    let expected = match v1.compare(&v2).unwrap() {
        Ordering::Less => v2,
        _ => v1,
    };

    sync(&*s1, &*s2).unwrap();
    sync(&*s2, &*s1).unwrap();

    assert_eq!(s1.get("B").unwrap(), Some(expected.clone()));
    assert_eq!(s2.get("B").unwrap(), Some(expected));
    assert_converged(&*s1, &*s2);
}

#[test]
fn first_page_holds_the_oldest_revisions() {
    let store = TestStore::memory("s");
    seed(&store, "d", 5);

    let page = store.get_docs_since(0, 2).unwrap();
    assert_eq!(page.current_sequence_id, 5);
    let revs: Vec<_> = page.documents.iter().map(Document::rev).collect();
    assert_eq!(revs, vec![Some(1), Some(2)]);
}

#[test]
fn hosted_store_pages_like_a_local_one() {
    let host = LoopbackHost::default();
    let remote = host.remote("paged");
    for i in 0..5i64 {
        remote.put_if_needed(&doc(&format!("d{i}"), i)).unwrap();
    }

    let page = remote.get_docs_since(0, 2).unwrap();
    assert_eq!(page.current_sequence_id, 5);
    let ids: Vec<_> = page.documents.iter().map(|d| d.id().to_string()).collect();
    assert_eq!(ids, vec!["d0", "d1"]);
}

#[test]
fn local_stores_converge_through_a_hosted_hub() {
    let host = LoopbackHost::default();
    let hub = host.remote("hub");
    let laptop = TestStore::memory("laptop");
    seed(&laptop, "l", 4);
    hub.put_if_needed(&doc("shared", "hub")).unwrap();

    sync(&*laptop, &hub).unwrap();
    assert_converged(&*laptop, &hub);
    assert_eq!(
        laptop.get("shared").unwrap().unwrap().get("value"),
        Some(&Value::from("hub"))
    );
    assert_eq!(
        laptop.peer_sequence_id(hub.id()),
        hub.info().unwrap().sequence_id
    );
}

#[test]
fn deletes_reach_every_replica() {
    let host = LoopbackHost::new(ServerConfig::new().with_max_chunk_size(2));
    let remote = host.remote("notes");
    let local = TestStore::memory("local");
    seed(&local, "n", 3);
    sync(&*local, &remote).unwrap();

    assert!(local.delete("n1").unwrap());
    pull(&*local, &remote).unwrap();

    let tombstone = remote.get("n1").unwrap().unwrap();
    assert!(tombstone.is_deleted());
    assert_eq!(tombstone.get("value"), Some(&Value::Integer(1)));
    assert_eq!(tombstone, local.get("n1").unwrap().unwrap());
}

#[test]
fn edits_after_sync_flow_both_ways() {
    let a = TestStore::memory("a");
    let b = TestStore::memory("b");
    a.put_if_needed(&doc("A", "v1")).unwrap();
    sync(&*a, &*b).unwrap();

    let edited = b.put_with_new_rev(&doc("A", "v2")).unwrap();
    a.put_with_new_rev(&doc("Z", "new")).unwrap();
    let stats = sync(&*a, &*b).unwrap();

    assert_eq!(stats.documents_written(), 2);
    assert_eq!(a.get("A").unwrap(), Some(edited));
    assert_converged(&*a, &*b);
}
