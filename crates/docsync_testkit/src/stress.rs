//! Stress helpers for concurrent datastore access.

use crate::fixtures::doc;
use docsync_core::Datastore;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Operations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Number of distinct document ids.
    pub document_count: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 1_000,
            threads: 4,
            document_count: 64,
        }
    }
}

/// Runs local edits from several threads against one datastore.
///
/// Every thread rewrites documents from a shared id pool with
/// `put_with_new_rev`, so writers constantly race on the same ids.
pub fn stress_concurrent_edits(store: Arc<Datastore>, config: &StressConfig) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let operations = config.operations;
            let document_count = config.document_count.max(1);

            thread::spawn(move || {
                for i in 0..operations {
                    let id = format!("doc-{}", (i * 7 + t) % document_count);
                    let edit = doc(&id, format!("thread {t} op {i}"));
                    match store.put_with_new_rev(&edit) {
                        Ok(_) => successful.fetch_add(1, Ordering::Relaxed),
                        Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                    };
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Stress thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Checks the revision invariants after concurrent writes: revisions are
/// unique, none exceeds the sequence id, and the last one equals it.
pub fn verify_revisions(store: &Datastore) -> Result<(), String> {
    let page = store
        .get_docs_since(0, usize::MAX)
        .map_err(|e| e.to_string())?;
    let mut seen = BTreeSet::new();
    for d in &page.documents {
        let rev = d.rev().ok_or_else(|| format!("{} has no _rev", d.id()))?;
        if !seen.insert(rev) {
            return Err(format!("revision {rev} used twice"));
        }
        if rev > page.current_sequence_id {
            return Err(format!("{} has _rev {rev} past the sequence id", d.id()));
        }
    }
    match seen.last() {
        Some(&max) if max != page.current_sequence_id => Err(format!(
            "highest _rev {max} differs from sequence id {}",
            page.current_sequence_id
        )),
        _ => Ok(()),
    }
}
