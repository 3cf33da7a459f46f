//! User accounts.

use crate::otp::OtpCode;
use bazar_commerce::ids::{ProductId, UserId};
use bazar_store::Document;
use serde::{Deserialize, Serialize};

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Get the role as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// The refresh token currently accepted for a user.
///
/// Only the most recently issued refresh token is honored; issuing a
/// new one invalidates the previous session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshSession {
    /// The refresh JWT as handed to the client.
    pub token: String,
    /// Unix timestamp of expiry.
    pub expires_at: i64,
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email, stored lowercase and unique across users.
    pub email: String,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Role deciding admin access.
    pub role: Role,
    /// Whether an administrator has blocked this account.
    pub is_block: bool,
    /// Products the user has wishlisted.
    pub wishlist: Vec<ProductId>,
    /// Active refresh session, if logged in.
    pub refresh_session: Option<RefreshSession>,
    /// Pending password reset code, if requested.
    pub reset_otp: Option<OtpCode>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl User {
    /// Create a new unprivileged user. The email is lowercased.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = current_timestamp();
        Self {
            id: UserId::generate(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into().to_lowercase(),
            password_hash: password_hash.into(),
            role: Role::User,
            is_block: false,
            wishlist: Vec::new(),
            refresh_session: None,
            reset_otp: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Grant the admin role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Check if the user is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Toggle a product on the wishlist. Returns whether it is on the
    /// list afterwards.
    pub fn toggle_wishlist(&mut self, product: &ProductId) -> bool {
        let added = if self.wishlist.contains(product) {
            self.wishlist.retain(|p| p != product);
            false
        } else {
            self.wishlist.push(product.clone());
            true
        };
        self.updated_at = current_timestamp();
        added
    }

    /// Replace the active refresh session.
    pub fn set_refresh_session(&mut self, token: impl Into<String>, expires_at: i64) {
        self.refresh_session = Some(RefreshSession {
            token: token.into(),
            expires_at,
        });
        self.updated_at = current_timestamp();
    }

    /// Drop the active refresh session, e.g. on logout.
    pub fn clear_refresh_session(&mut self) {
        self.refresh_session = None;
        self.updated_at = current_timestamp();
    }

    /// Check whether a presented refresh token is the live one.
    pub fn refresh_session_matches(&self, token: &str, now: i64) -> bool {
        match &self.refresh_session {
            Some(session) => session.token == token && now < session.expires_at,
            None => false,
        }
    }

    /// Store a new password hash, dropping any pending reset code.
    pub fn set_password_hash(&mut self, hash: impl Into<String>) {
        self.password_hash = hash.into();
        self.reset_otp = None;
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
