//! CLI command implementations.

pub mod dump;
pub mod inspect;
pub mod put;
pub mod sync;
pub mod verify;

use docsync_core::{Datastore, DatastoreConfig};
use std::path::Path;

/// Opens the journal at `path`, which must already exist.
pub fn open_existing(path: &Path) -> Result<Datastore, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No datastore found at {:?}", path).into());
    }
    Ok(Datastore::open_file(path, DatastoreConfig::new())?)
}

/// Opens the journal at `path`, creating it and its parent directories.
pub fn open_or_create(path: &Path) -> Result<Datastore, Box<dyn std::error::Error>> {
    Ok(Datastore::open_file(path, DatastoreConfig::new())?)
}
