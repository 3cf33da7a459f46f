//! Brand types.

use crate::catalog::slugify;
use crate::ids::BrandId;
use bazar_store::Document;
use serde::{Deserialize, Serialize};

/// A product brand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Brand {
    /// Unique brand identifier.
    pub id: BrandId,
    /// Brand title.
    pub title: String,
    /// URL-friendly slug, unique across brands.
    pub slug: String,
    /// Whether the brand is shown on the storefront.
    pub is_published: bool,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Document for Brand {
    const COLLECTION: &'static str = "brands";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Brand {
    /// Create a new unpublished brand. The slug is derived from the title.
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let now = current_timestamp();
        Self {
            id: BrandId::generate(),
            slug: slugify(&title),
            title,
            is_published: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Flip storefront visibility, returning the new state.
    pub fn toggle_published(&mut self) -> bool {
        self.is_published = !self.is_published;
        self.updated_at = current_timestamp();
        self.is_published
    }

    /// Rename the brand, refreshing the slug.
    pub fn rename(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.slug = slugify(&self.title);
        self.updated_at = current_timestamp();
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
