//! Blog post types.

use crate::catalog::slugify;
use crate::ids::{BlogId, CategoryId, UserId};
use bazar_store::Document;
use serde::{Deserialize, Serialize};

/// A blog post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Blog {
    /// Unique post identifier.
    pub id: BlogId,
    /// Post title.
    pub title: String,
    /// URL-friendly slug.
    pub slug: String,
    /// Post body.
    pub description: String,
    /// Author display name.
    pub author: String,
    /// Blog category, if assigned.
    pub category: Option<CategoryId>,
    /// View counter, bumped on every read.
    pub num_views: i64,
    /// Users who liked the post.
    pub likes: Vec<UserId>,
    /// Users who disliked the post.
    pub dislikes: Vec<UserId>,
    /// Cover image URL.
    pub cover_image: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Document for Blog {
    const COLLECTION: &'static str = "blogs";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Blog {
    /// Create a new post. The slug is derived from the title.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let title = title.into();
        let now = current_timestamp();
        Self {
            id: BlogId::generate(),
            slug: slugify(&title),
            title,
            description: description.into(),
            author: "admin".to_string(),
            category: None,
            num_views: 0,
            likes: Vec::new(),
            dislikes: Vec::new(),
            cover_image: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the author display name.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Assign a category.
    pub fn with_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    /// Count one view.
    pub fn record_view(&mut self) {
        self.num_views += 1;
    }

    /// Toggle a like from a user.
    ///
    /// Liking removes any earlier dislike; liking twice takes the like
    /// back. Returns whether the user likes the post afterwards.
    pub fn toggle_like(&mut self, user: &UserId) -> bool {
        self.dislikes.retain(|u| u != user);
        if self.likes.contains(user) {
            self.likes.retain(|u| u != user);
            self.updated_at = current_timestamp();
            false
        } else {
            self.likes.push(user.clone());
            self.updated_at = current_timestamp();
            true
        }
    }

    /// Toggle a dislike from a user. Mirror of [`Blog::toggle_like`].
    pub fn toggle_dislike(&mut self, user: &UserId) -> bool {
        self.likes.retain(|u| u != user);
        if self.dislikes.contains(user) {
            self.dislikes.retain(|u| u != user);
            self.updated_at = current_timestamp();
            false
        } else {
            self.dislikes.push(user.clone());
            self.updated_at = current_timestamp();
            true
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_blog() {
        let blog = Blog::new("Summer Sale Guide", "Everything on sale.");
        assert_eq!(blog.slug, "summer-sale-guide");
        assert_eq!(blog.num_views, 0);
    }

    #[test]
    fn test_toggle_like() {
        let mut blog = Blog::new("Post", "Body");
        let user = UserId::new("u1");

        assert!(blog.toggle_like(&user));
        assert_eq!(blog.likes.len(), 1);
        assert!(!blog.toggle_like(&user));
        assert!(blog.likes.is_empty());
    }

    #[test]
    fn test_like_clears_dislike() {
        let mut blog = Blog::new("Post", "Body");
        let user = UserId::new("u1");

        blog.toggle_dislike(&user);
        assert_eq!(blog.dislikes.len(), 1);

        blog.toggle_like(&user);
        assert!(blog.dislikes.is_empty());
        assert_eq!(blog.likes.len(), 1);
    }

    #[test]
    fn test_record_view() {
        let mut blog = Blog::new("Post", "Body");
        blog.record_view();
        blog.record_view();
        assert_eq!(blog.num_views, 2);
    }
}
