//! Inspect command implementation.

use super::open_existing;
use docsync_core::Datastore;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Datastore inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Journal path.
    pub path: String,
    /// Journal size in bytes.
    pub journal_size: u64,
    /// Datastore id.
    pub id: String,
    /// Current sequence id.
    pub sequence_id: u64,
    /// Stored documents, tombstones included.
    pub documents: usize,
    /// Tombstones among them.
    pub tombstones: usize,
    /// Last sequence id pulled from each peer.
    pub peers: BTreeMap<String, u64>,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_existing(path)?;
    let mut result = inspect(&store)?;
    result.path = path.display().to_string();
    result.journal_size = std::fs::metadata(path)?.len();

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Collects the metadata of an open datastore.
pub fn inspect(store: &Datastore) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let report = store.check()?;
    Ok(InspectResult {
        path: String::new(),
        journal_size: 0,
        id: store.id().to_string(),
        sequence_id: store.sequence_id(),
        documents: report.documents,
        tombstones: report.tombstones,
        peers: store.peers(),
    })
}

fn print_text_output(result: &InspectResult) {
    println!("docsync datastore: {}", result.path);
    println!();
    println!("Id:          {}", result.id);
    println!("Sequence id: {}", result.sequence_id);
    println!("Journal:     {} bytes", result.journal_size);
    println!(
        "Documents:   {} ({} live, {} tombstones)",
        result.documents,
        result.documents - result.tombstones,
        result.tombstones
    );

    if result.peers.is_empty() {
        println!("Peers:       none");
    } else {
        println!("Peers:");
        for (peer, sequence_id) in &result.peers {
            println!("  {peer}: {sequence_id}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsync_codec::Document;
    use docsync_core::DatastoreConfig;

    #[test]
    fn inspect_counts_tombstones_and_peers() {
        let store =
            Datastore::open_in_memory_with_config(DatastoreConfig::new().id("main")).unwrap();
        for id in ["A", "B", "C"] {
            store.put_if_needed(&Document::new(id)).unwrap();
        }
        store.delete("B").unwrap();
        store.set_peer_sequence_id("laptop", 7).unwrap();

        let result = inspect(&store).unwrap();
        assert_eq!(result.id, "main");
        assert_eq!(result.sequence_id, 4);
        assert_eq!(result.documents, 3);
        assert_eq!(result.tombstones, 1);
        assert_eq!(result.peers.get("laptop"), Some(&7));
    }

    #[test]
    fn missing_journal_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(&dir.path().join("absent.journal"), "text").is_err());
    }
}
