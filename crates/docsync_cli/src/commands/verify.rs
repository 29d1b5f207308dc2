//! Verify command implementation.

use super::open_existing;
use docsync_core::CheckReport;
use std::path::Path;

/// Runs the verify command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying datastore at {:?}", path);
    println!();

    // Replaying the journal already rejects corrupt committed records.
    let store = open_existing(path)?;
    let report = store.check()?;
    print_report(&report);

    println!();
    if report.is_ok() {
        println!("✓ Datastore verification passed");
        Ok(())
    } else {
        println!("✗ Datastore verification failed");
        Err("Verification failed".into())
    }
}

fn print_report(report: &CheckReport) {
    println!("  Documents checked: {}", report.documents);
    println!("  Tombstones:        {}", report.tombstones);
    println!("  Sequence id:       {}", report.sequence_id);
    println!("  Highest _rev:      {}", report.max_rev);
    if !report.issues.is_empty() {
        println!("  Issues:");
        for issue in report.issues.iter().take(10) {
            println!("    - {issue}");
        }
        if report.issues.len() > 10 {
            println!("    ... and {} more", report.issues.len() - 10);
        }
    }
}
