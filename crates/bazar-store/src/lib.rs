//! Embeddable JSON document store.
//!
//! Documents are plain serde types organized into named collections.
//! The store keeps everything in memory behind a lock, which makes it
//! cheap to spin up in tests and safe to share across service handlers.
//!
//! ```
//! use bazar_store::{filter, Document, FindOptions, Store};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Brand {
//!     id: String,
//!     slug: String,
//! }
//!
//! impl Document for Brand {
//!     const COLLECTION: &'static str = "brands";
//!     fn id(&self) -> &str {
//!         &self.id
//!     }
//! }
//!
//! let store = Store::new();
//! store.insert(&Brand { id: "b1".into(), slug: "acme".into() }).unwrap();
//! let found: Option<Brand> = store.find_one(&filter! {"slug" => "acme"}).unwrap();
//! assert!(found.is_some());
//! ```

mod error;
mod filter;
mod store;

pub use error::StoreError;
pub use filter::{Filter, FindOptions, SortOrder};
pub use store::{Store, Txn};

/// A serde type that lives in a named collection.
pub trait Document: serde::Serialize + serde::de::DeserializeOwned {
    /// Collection the type is stored in.
    const COLLECTION: &'static str;

    /// Stable identifier of this document.
    fn id(&self) -> &str;
}

/// Build an equality [`Filter`] from `path => value` pairs.
///
/// ```
/// use bazar_store::filter;
///
/// let f = filter! {"role" => "admin", "is_block" => false};
/// ```
#[macro_export]
macro_rules! filter {
    () => {
        $crate::Filter::new()
    };
    ($($path:expr => $value:expr),+ $(,)?) => {
        $crate::Filter::new()$(.eq($path, $value))+
    };
}
