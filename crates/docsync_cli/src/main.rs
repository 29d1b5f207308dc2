//! docsync CLI
//!
//! Command-line tools for journal-backed docsync datastores.
//!
//! # Commands
//!
//! - `inspect` - Display datastore metadata and peer cursors
//! - `verify` - Check revisions against the sequence id
//! - `dump` - Print documents changed since a sequence id
//! - `put` - Store a JSON document
//! - `delete` - Write a tombstone
//! - `sync` - Replicate with another datastore

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// docsync command-line datastore tools.
#[derive(Parser)]
#[command(name = "docsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the datastore journal
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display datastore metadata and peer cursors
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Check every stored revision against the sequence id
    Verify,

    /// Print documents changed since a sequence id, one JSON object per line
    Dump {
        /// Only documents with a revision above this
        #[arg(short, long, default_value = "0")]
        since: u64,

        /// Maximum number of documents to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Hide tombstones
        #[arg(long)]
        live: bool,
    },

    /// Store a JSON document
    Put {
        /// The document, e.g. '{"_id":"A","value":"v1"}'
        document: String,

        /// Stamp a new revision instead of resolving against the stored one
        #[arg(short, long)]
        new_rev: bool,
    },

    /// Write a tombstone for a document
    Delete {
        /// Document id
        id: String,
    },

    /// Replicate with another datastore journal
    Sync {
        /// Journal of the other datastore
        other: PathBuf,

        /// Only pull from the other datastore
        #[arg(long)]
        pull_only: bool,

        /// Documents requested per page
        #[arg(long, default_value_t = docsync_sync_engine::DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Datastore path required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Verify => {
            let path = cli.path.ok_or("Datastore path required for verify")?;
            commands::verify::run(&path)?;
        }
        Commands::Dump { since, limit, live } => {
            let path = cli.path.ok_or("Datastore path required for dump")?;
            commands::dump::run(&path, since, limit, live)?;
        }
        Commands::Put { document, new_rev } => {
            let path = cli.path.ok_or("Datastore path required for put")?;
            commands::put::run(&path, &document, new_rev)?;
        }
        Commands::Delete { id } => {
            let path = cli.path.ok_or("Datastore path required for delete")?;
            commands::put::delete(&path, &id)?;
        }
        Commands::Sync {
            other,
            pull_only,
            page_size,
        } => {
            let path = cli.path.ok_or("Datastore path required for sync")?;
            commands::sync::run(&path, &other, pull_only, page_size)?;
        }
        Commands::Version => {
            println!("docsync CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("docsync core v{}", docsync_core::VERSION);
        }
    }

    Ok(())
}
