//! Datastore identifiers.

use uuid::Uuid;

/// Generates a random datastore id: 32 lowercase hex characters.
pub fn new_store_id() -> String {
    Uuid::new_v4().simple().to_string()
}
