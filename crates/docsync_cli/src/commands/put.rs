//! Put and delete command implementations.

use super::{open_existing, open_or_create};
use docsync_codec::json::from_json;
use docsync_core::Datastore;
use std::path::Path;
use tracing::info;

/// Runs the put command. Creates the journal if it does not exist.
pub fn run(path: &Path, document: &str, new_rev: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_or_create(path)?;
    match put(&store, document, new_rev)? {
        Some(rev) => println!("stored {} at _rev {rev}", store.id()),
        None => println!("ignored: the stored version wins"),
    }
    Ok(())
}

/// Stores a JSON document and returns the stored revision, or `None` if the
/// stored version won.
pub fn put(
    store: &Datastore,
    document: &str,
    new_rev: bool,
) -> Result<Option<u64>, Box<dyn std::error::Error>> {
    let doc = from_json(document)?;
    if new_rev {
        let stored = store.put_with_new_rev(&doc)?;
        info!(doc_id = %stored.id(), rev = ?stored.rev(), "document stored");
        return Ok(stored.rev());
    }
    if store.put_if_needed(&doc)? {
        let stored = store.get(doc.id())?;
        info!(doc_id = %doc.id(), "document stored");
        Ok(stored.and_then(|d| d.rev()))
    } else {
        Ok(None)
    }
}

/// Runs the delete command.
pub fn delete(path: &Path, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_existing(path)?;
    if store.delete(id)? {
        println!("deleted {id} at _rev {}", store.sequence_id());
    } else {
        println!("{id} is absent or already deleted");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_resolves_against_stored_version() {
        let store = Datastore::open_in_memory().unwrap();
        assert_eq!(put(&store, r#"{"_id":"A","v":"1"}"#, false).unwrap(), Some(1));
        assert_eq!(put(&store, r#"{"_id":"A","v":"2"}"#, false).unwrap(), None);
        assert_eq!(put(&store, r#"{"_id":"A","v":"2"}"#, true).unwrap(), Some(2));
    }

    #[test]
    fn put_rejects_bad_json() {
        let store = Datastore::open_in_memory().unwrap();
        assert!(put(&store, r#"{"_id":"A","v":1.5}"#, false).is_err());
        assert!(put(&store, r#"{"v":1}"#, false).is_err());
    }

    #[test]
    fn put_creates_and_delete_reopens_journal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("main.journal");
        run(&path, r#"{"_id":"A"}"#, false).unwrap();
        delete(&path, "A").unwrap();

        let store = crate::commands::open_existing(&path).unwrap();
        assert!(store.get("A").unwrap().unwrap().is_deleted());
        assert_eq!(store.sequence_id(), 2);
    }
}
