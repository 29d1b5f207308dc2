//! Dump command implementation.

use super::open_existing;
use docsync_codec::json::to_json;
use docsync_core::Datastore;
use std::path::Path;

/// Documents requested per page while dumping.
const PAGE_SIZE: usize = 256;

/// Runs the dump command.
pub fn run(
    path: &Path,
    since: u64,
    limit: Option<usize>,
    live_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_existing(path)?;
    for line in collect(&store, since, limit, live_only)? {
        println!("{line}");
    }
    Ok(())
}

/// Walks the change feed from `since` and encodes each document as one
/// JSON line.
pub fn collect(
    store: &Datastore,
    since: u64,
    limit: Option<usize>,
    live_only: bool,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let limit = limit.unwrap_or(usize::MAX);
    let mut lines = Vec::new();
    let mut cursor = since;

    while lines.len() < limit {
        let page = store.get_docs_since(cursor, PAGE_SIZE)?;
        if page.documents.is_empty() {
            break;
        }
        for doc in &page.documents {
            cursor = cursor.max(doc.rev().unwrap_or(cursor));
            if live_only && doc.is_deleted() {
                continue;
            }
            if lines.len() == limit {
                break;
            }
            lines.push(to_json(doc)?);
        }
    }

    Ok(lines)
}
