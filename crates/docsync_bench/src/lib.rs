//! Benchmark utilities.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use docsync_codec::Document;
use docsync_core::Datastore;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Generate a random alphanumeric string of the specified length.
pub fn random_text(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate a document with `fields` text fields of `field_len` characters
/// plus one integer field.
pub fn random_document(id: &str, fields: usize, field_len: usize) -> Document {
    let mut rng = rand::thread_rng();
    let mut doc = Document::new(id);
    for i in 0..fields {
        doc.set(format!("f{i:02}"), random_text(field_len))
            .expect("field names are not reserved");
    }
    doc.set("n", rng.gen::<i64>())
        .expect("field names are not reserved");
    doc
}

/// Generate a batch of documents named `doc-{i}`.
pub fn generate_documents(count: usize, fields: usize) -> Vec<Document> {
    (0..count)
        .map(|i| random_document(&format!("doc-{i}"), fields, 16))
        .collect()
}

/// Open an in-memory datastore holding `count` fresh documents.
pub fn seeded_store(id: &str, count: usize, fields: usize) -> Datastore {
    let store = Datastore::open_in_memory_with_config(docsync_core::DatastoreConfig::new().id(id))
        .expect("in-memory datastore opens");
    for doc in generate_documents(count, fields) {
        store.put_if_needed(&doc).expect("fresh document is stored");
    }
    store
}
