//! Product types.

use crate::catalog::slugify;
use crate::error::CommerceError;
use crate::ids::{BrandId, CategoryId, ProductId, UserId};
use crate::money::Money;
use bazar_store::Document;
use serde::{Deserialize, Serialize};

/// Highest star value a rating may carry.
pub const MAX_STARS: u8 = 5;

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// URL-friendly slug.
    pub slug: String,
    /// Product description.
    pub description: Option<String>,
    /// Unit price.
    pub price: Money,
    /// Units in stock.
    pub quantity: i64,
    /// Units sold so far.
    pub sold: i64,
    /// Image URLs.
    pub images: Vec<String>,
    /// Available colors.
    pub colors: Vec<String>,
    /// Brand, if assigned.
    pub brand: Option<BrandId>,
    /// Category, if assigned.
    pub category: Option<CategoryId>,
    /// Customer ratings, one per user.
    pub ratings: Vec<Rating>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Document for Product {
    const COLLECTION: &'static str = "products";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Product {
    /// Create a new product. The slug is derived from the title.
    pub fn new(title: impl Into<String>, price: Money) -> Self {
        let title = title.into();
        let now = current_timestamp();
        Self {
            id: ProductId::generate(),
            slug: slugify(&title),
            title,
            description: None,
            price,
            quantity: 0,
            sold: 0,
            images: Vec::new(),
            colors: Vec::new(),
            brand: None,
            category: None,
            ratings: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the initial stock level.
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    /// Assign a brand.
    pub fn with_brand(mut self, brand: BrandId) -> Self {
        self.brand = Some(brand);
        self
    }

    /// Assign a category.
    pub fn with_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    /// Check if any stock remains.
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Take `quantity` units out of stock and count them as sold.
    ///
    /// Fails without mutating if stock cannot cover the request.
    pub fn take_stock(&mut self, quantity: i64) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        if quantity > self.quantity {
            return Err(CommerceError::InsufficientStock {
                product_id: self.id.to_string(),
                requested: quantity,
                available: self.quantity,
            });
        }
        self.quantity -= quantity;
        self.sold += quantity;
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Return `quantity` units to stock, e.g. after an order is cancelled.
    pub fn return_stock(&mut self, quantity: i64) {
        self.quantity += quantity;
        self.sold = (self.sold - quantity).max(0);
        self.updated_at = current_timestamp();
    }

    /// Record a star rating from a user.
    ///
    /// A user rates a product at most once; rating again replaces the
    /// earlier stars and comment.
    pub fn rate(
        &mut self,
        user: UserId,
        stars: u8,
        comment: Option<String>,
    ) -> Result<(), CommerceError> {
        if stars == 0 || stars > MAX_STARS {
            return Err(CommerceError::ValidationError(format!(
                "stars must be between 1 and {}",
                MAX_STARS
            )));
        }
        if let Some(existing) = self.ratings.iter_mut().find(|r| r.posted_by == user) {
            existing.stars = stars;
            existing.comment = comment;
        } else {
            self.ratings.push(Rating {
                stars,
                comment,
                posted_by: user,
            });
        }
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Average star rating, derived from the ratings list.
    ///
    /// Returns None when the product has no ratings yet.
    pub fn average_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let sum: u32 = self.ratings.iter().map(|r| r.stars as u32).sum();
        Some(sum as f64 / self.ratings.len() as f64)
    }
}

/// A single customer rating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    /// Stars awarded (1 to 5).
    pub stars: u8,
    /// Optional review text.
    pub comment: Option<String>,
    /// User who posted the rating.
    pub posted_by: UserId,
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
