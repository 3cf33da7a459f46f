//! Store error types.

use thiserror::Error;

/// Errors produced by the document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A document with the same id already exists in the collection.
    #[error("duplicate id {id} in collection {collection}")]
    DuplicateId {
        collection: &'static str,
        id: String,
    },

    /// A document could not be serialized to JSON.
    #[error("serialize error: {0}")]
    Serialize(String),

    /// A stored document could not be deserialized into the requested type.
    #[error("deserialize error: {0}")]
    Deserialize(String),

    /// The store lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}
