//! Category types for organizing products and blog posts.
//!
//! Categories form a forest via parent pointers. The same collection
//! serves both the product catalog and the blog; a category's kind
//! decides which side it belongs to, and slugs are only unique within
//! a kind.

use crate::error::CommerceError;
use crate::ids::CategoryId;
use bazar_store::Document;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which side of the site a category organizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Product,
    Blog,
}

impl CategoryKind {
    /// Get the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Product => "product",
            CategoryKind::Blog => "blog",
        }
    }

    /// Parse a kind string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "product" => Some(CategoryKind::Product),
            "blog" => Some(CategoryKind::Blog),
            _ => None,
        }
    }
}

/// A category in the hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Parent category ID (None for root categories).
    pub parent: Option<CategoryId>,
    /// Category title.
    pub title: String,
    /// URL-friendly slug, unique within the kind.
    pub slug: String,
    /// Which side of the site this category belongs to.
    pub kind: CategoryKind,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Document for Category {
    const COLLECTION: &'static str = "categories";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Category {
    /// Create a new root category. The slug is derived from the title.
    pub fn new(title: impl Into<String>, kind: CategoryKind) -> Self {
        let title = title.into();
        let now = current_timestamp();
        Self {
            id: CategoryId::generate(),
            parent: None,
            slug: slugify(&title),
            title,
            kind,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach this category under a parent.
    ///
    /// The parent must organize the same side of the site.
    pub fn with_parent(mut self, parent: &Category) -> Result<Self, CommerceError> {
        if parent.kind != self.kind {
            return Err(CommerceError::CategoryKindMismatch {
                parent: parent.kind.as_str().to_string(),
                child: self.kind.as_str().to_string(),
            });
        }
        self.parent = Some(parent.id.clone());
        Ok(self)
    }

    /// Check if this is a root category.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Rename the category, refreshing the slug.
    pub fn rename(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.slug = slugify(&self.title);
        self.updated_at = current_timestamp();
    }
}

/// A category with its recursively collected children.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryNode {
    /// The category itself.
    #[serde(flatten)]
    pub category: Category,
    /// Direct children, each with their own subtree.
    pub children: Vec<CategoryNode>,
}

/// Build the subtree rooted at `root` from a flat list of categories.
///
/// Walks parent pointers breadth-down. A category reachable from itself
/// means the stored hierarchy is corrupt; that is reported as an error
/// instead of looping forever.
pub fn build_tree(root: &Category, all: &[Category]) -> Result<CategoryNode, CommerceError> {
    let mut seen = HashSet::new();
    build_subtree(root, all, &mut seen)
}

fn build_subtree(
    root: &Category,
    all: &[Category],
    seen: &mut HashSet<CategoryId>,
) -> Result<CategoryNode, CommerceError> {
    if !seen.insert(root.id.clone()) {
        return Err(CommerceError::CorruptHierarchy(root.id.to_string()));
    }

    let mut children = Vec::new();
    for cat in all {
        if cat.parent.as_ref() == Some(&root.id) {
            children.push(build_subtree(cat, all, seen)?);
        }
    }

    Ok(CategoryNode {
        category: root.clone(),
        children,
    })
}

/// Turn a title into a URL-friendly slug.
///
/// Lowercases ASCII, collapses runs of non-alphanumeric characters into
/// single hyphens, and trims leading/trailing hyphens. Non-ASCII
/// letters (e.g. Persian) are kept as-is.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true;
    for c in title.chars() {
        if c.is_alphanumeric() {
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Mobile Phones"), "mobile-phones");
        assert_eq!(slugify("  Hello,   World! "), "hello-world");
        assert_eq!(slugify("USB-C Cables"), "usb-c-cables");
    }

    #[test]
    fn test_root_category() {
        let cat = Category::new("Electronics", CategoryKind::Product);
        assert!(cat.is_root());
        assert_eq!(cat.slug, "electronics");
    }

    #[test]
    fn test_child_requires_matching_kind() {
        let parent = Category::new("Electronics", CategoryKind::Product);
        let child = Category::new("Phones", CategoryKind::Product)
            .with_parent(&parent)
            .unwrap();
        assert_eq!(child.parent, Some(parent.id.clone()));

        let result = Category::new("News", CategoryKind::Blog).with_parent(&parent);
        assert!(matches!(
            result,
            Err(CommerceError::CategoryKindMismatch { .. })
        ));
    }

    #[test]
    fn test_build_tree() {
        let root = Category::new("Electronics", CategoryKind::Product);
        let phones = Category::new("Phones", CategoryKind::Product)
            .with_parent(&root)
            .unwrap();
        let android = Category::new("Android", CategoryKind::Product)
            .with_parent(&phones)
            .unwrap();
        let laptops = Category::new("Laptops", CategoryKind::Product)
            .with_parent(&root)
            .unwrap();

        let all = vec![root.clone(), phones, android, laptops];
        let tree = build_tree(&root, &all).unwrap();

        assert_eq!(tree.children.len(), 2);
        let phones_node = tree
            .children
            .iter()
            .find(|n| n.category.slug == "phones")
            .unwrap();
        assert_eq!(phones_node.children.len(), 1);
        assert_eq!(phones_node.children[0].category.slug, "android");
    }

    #[test]
    fn test_cycle_reported_not_looped() {
        let mut a = Category::new("A", CategoryKind::Product);
        let mut b = Category::new("B", CategoryKind::Product);
        a.parent = Some(b.id.clone());
        b.parent = Some(a.id.clone());

        let all = vec![a.clone(), b];
        assert!(matches!(
            build_tree(&a, &all),
            Err(CommerceError::CorruptHierarchy(_))
        ));
    }

    #[test]
    fn test_rename_refreshes_slug() {
        let mut cat = Category::new("Old Title", CategoryKind::Blog);
        cat.rename("New Title");
        assert_eq!(cat.slug, "new-title");
    }
}
