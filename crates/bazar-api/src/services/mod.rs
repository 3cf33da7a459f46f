//! Resource services.

pub mod addresses;
pub mod auth;
pub mod blogs;
pub mod brands;
pub mod carts;
pub mod categories;
pub mod contacts;
pub mod coupons;
pub mod orders;
pub mod products;
pub mod users;

use crate::ApiError;
use bazar_auth::User;
use bazar_store::FindOptions;

/// Page selector for list endpoints. Pages are 1-based.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
}

impl Pagination {
    /// First page with the given size.
    pub fn first(limit: usize) -> Self {
        Self { page: 1, limit }
    }

    pub(crate) fn apply(&self, options: FindOptions) -> FindOptions {
        let skip = self.page.saturating_sub(1).saturating_mul(self.limit);
        options.skip(skip).limit(self.limit)
    }
}

pub(crate) fn require_admin(actor: &User) -> Result<(), ApiError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Admin role required".to_string()))
    }
}

/// Minimal shape check for email addresses.
pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    let trimmed = email.trim();
    let valid = trimmed.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    });
    if valid {
        Ok(())
    } else {
        Err(ApiError::Validation(format!("Invalid email: {}", email)))
    }
}

/// Get current Unix timestamp.
pub(crate) fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
