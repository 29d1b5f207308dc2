//! Sync command implementation.

use super::{open_existing, open_or_create};
use docsync_sync_engine::{PullStats, Replicator, SyncConfig};
use std::path::Path;

/// Runs the sync command.
///
/// `other` must exist. `path` is created if missing, so
/// `sync --pull-only` into a new journal makes a copy.
pub fn run(
    path: &Path,
    other: &Path,
    pull_only: bool,
    page_size: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    if path == other {
        return Err("Cannot sync a datastore with itself".into());
    }
    let local = open_or_create(path)?;
    let remote = open_existing(other)?;
    let replicator = Replicator::new(SyncConfig::new().with_page_size(page_size));

    if pull_only {
        print_pull(&replicator.pull(&remote, &local)?);
    } else {
        let stats = replicator.sync(&local, &remote)?;
        print_pull(&stats.a_to_b);
        print_pull(&stats.b_to_a);
    }
    Ok(())
}

fn print_pull(stats: &PullStats) {
    println!(
        "{} -> {}: {} received, {} written in {} pages (cursor {})",
        stats.source,
        stats.target,
        stats.documents_received,
        stats.documents_written,
        stats.pages,
        stats.cursor
    );
}
