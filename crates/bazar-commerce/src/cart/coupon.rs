//! Coupon types and redemption rules.

use crate::error::CommerceError;
use crate::ids::{CouponId, UserId};
use crate::money::Money;
use bazar_store::Document;
use serde::{Deserialize, Serialize};

/// Value of a coupon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CouponValue {
    /// Percentage off the cart subtotal (0.0 - 100.0).
    Percentage(f64),
    /// Fixed amount off the cart subtotal.
    Fixed(Money),
}

impl CouponValue {
    /// Calculate the discount granted against a subtotal.
    ///
    /// A fixed discount never exceeds the subtotal.
    pub fn discount_for(&self, subtotal: &Money) -> Result<Money, CommerceError> {
        match self {
            CouponValue::Percentage(percent) => Ok(subtotal.percentage(*percent)),
            CouponValue::Fixed(amount) => {
                if amount.currency != subtotal.currency {
                    return Err(CommerceError::CurrencyMismatch {
                        expected: subtotal.currency.code().to_string(),
                        got: amount.currency.code().to_string(),
                    });
                }
                if amount.amount_minor > subtotal.amount_minor {
                    Ok(*subtotal)
                } else {
                    Ok(*amount)
                }
            }
        }
    }
}

/// One recorded redemption of a coupon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Redemption {
    /// User who redeemed the coupon.
    pub user: UserId,
    /// Unix timestamp of the redemption.
    pub used_at: i64,
}

/// A coupon definition.
///
/// Each user may redeem a coupon at most once; redemptions are recorded
/// in `used_by`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    /// Unique coupon identifier.
    pub id: CouponId,
    /// Coupon code (e.g., "NOWRUZ10"). Stored uppercase.
    pub code: String,
    /// Discount value.
    pub value: CouponValue,
    /// Expiry date (Unix timestamp). None means no expiry.
    pub expires_at: Option<i64>,
    /// Maximum number of redemptions. None means unlimited.
    pub usage_limit: Option<i64>,
    /// Number of redemptions so far.
    pub used_count: i64,
    /// Who redeemed this coupon, and when.
    pub used_by: Vec<Redemption>,
    /// Whether the coupon can currently be redeemed.
    pub is_active: bool,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Document for Coupon {
    const COLLECTION: &'static str = "coupons";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Coupon {
    /// Create a new active coupon.
    pub fn new(code: impl Into<String>, value: CouponValue) -> Self {
        let now = current_timestamp();
        Self {
            id: CouponId::generate(),
            code: code.into().to_uppercase(),
            value,
            expires_at: None,
            usage_limit: None,
            used_count: 0,
            used_by: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set an expiry date.
    pub fn with_expiry(mut self, expires_at: i64) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Set a redemption limit.
    pub fn with_usage_limit(mut self, limit: i64) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    /// Check whether a user may redeem this coupon right now.
    pub fn check_redeemable(&self, user: &UserId, now: i64) -> Result<(), CommerceError> {
        if !self.is_active {
            return Err(CommerceError::InvalidCoupon(self.code.clone()));
        }
        if let Some(expires_at) = self.expires_at {
            if now >= expires_at {
                return Err(CommerceError::CouponExpired(self.code.clone()));
            }
        }
        if let Some(limit) = self.usage_limit {
            if self.used_count >= limit {
                return Err(CommerceError::CouponUsageLimitReached(self.code.clone()));
            }
        }
        if self.used_by.iter().any(|r| r.user == *user) {
            return Err(CommerceError::CouponAlreadyUsed(self.code.clone()));
        }
        Ok(())
    }

    /// Record a redemption by a user, stamping the time of use.
    pub fn record_redemption(&mut self, user: UserId) {
        let now = current_timestamp();
        self.used_count += 1;
        self.used_by.push(Redemption { user, used_at: now });
        self.updated_at = now;
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
