//! Coupon administration.

use crate::context::AppContext;
use crate::services::require_admin;
use crate::ApiError;
use bazar_auth::User;
use bazar_commerce::{CommerceError, Coupon, CouponValue, Money, Redemption};
use bazar_store::{filter, Filter, FindOptions};
use serde::Deserialize;

/// Input for [`create_coupon`]. Exactly one of `percent` or
/// `fixed_minor` must be set.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCouponInput {
    pub code: String,
    pub percent: Option<f64>,
    /// Fixed discount in the smallest currency unit.
    pub fixed_minor: Option<i64>,
    pub expires_at: Option<i64>,
    pub usage_limit: Option<i64>,
}

/// Create a coupon. Admin only. Codes are unique, case-insensitive.
pub fn create_coupon(
    ctx: &AppContext,
    actor: &User,
    input: CreateCouponInput,
) -> Result<Coupon, ApiError> {
    require_admin(actor)?;

    let value = match (input.percent, input.fixed_minor) {
        (Some(percent), None) => {
            if percent <= 0.0 || percent > 100.0 {
                return Err(ApiError::Validation(
                    "Percentage must be between 0 and 100".to_string(),
                ));
            }
            CouponValue::Percentage(percent)
        }
        (None, Some(amount)) => {
            if amount <= 0 {
                return Err(ApiError::Validation(
                    "Fixed discount must be positive".to_string(),
                ));
            }
            CouponValue::Fixed(Money::new(amount, ctx.config.currency))
        }
        _ => {
            return Err(ApiError::Validation(
                "Provide either a percentage or a fixed amount".to_string(),
            ))
        }
    };

    let code = input.code.trim().to_uppercase();
    if code.is_empty() {
        return Err(ApiError::Validation("Code is required".to_string()));
    }
    if find_by_code(ctx, &code)?.is_some() {
        return Err(ApiError::Conflict(format!("Coupon code already exists: {}", code)));
    }

    let mut coupon = Coupon::new(code, value);
    if let Some(expires_at) = input.expires_at {
        coupon = coupon.with_expiry(expires_at);
    }
    if let Some(limit) = input.usage_limit {
        if limit <= 0 {
            return Err(ApiError::Validation("Usage limit must be positive".to_string()));
        }
        coupon = coupon.with_usage_limit(limit);
    }
    ctx.store.insert(&coupon)?;

    tracing::info!(coupon = %coupon.id, code = %coupon.code, "coupon created");
    Ok(coupon)
}

/// Partial update for [`update_coupon`]. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCouponInput {
    pub code: Option<String>,
    pub expires_at: Option<i64>,
    pub usage_limit: Option<i64>,
}

/// Edit a coupon. Admin only. A new code must stay unique.
pub fn update_coupon(
    ctx: &AppContext,
    actor: &User,
    id: &str,
    input: UpdateCouponInput,
) -> Result<Coupon, ApiError> {
    require_admin(actor)?;
    let mut coupon = get_coupon(ctx, actor, id)?;

    if let Some(code) = input.code {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Err(ApiError::Validation("Code is required".to_string()));
        }
        if let Some(existing) = find_by_code(ctx, &code)? {
            if existing.id != coupon.id {
                return Err(ApiError::Conflict(format!(
                    "Coupon code already exists: {}",
                    code
                )));
            }
        }
        coupon.code = code;
    }
    if let Some(expires_at) = input.expires_at {
        coupon.expires_at = Some(expires_at);
    }
    if let Some(limit) = input.usage_limit {
        if limit <= 0 {
            return Err(ApiError::Validation("Usage limit must be positive".to_string()));
        }
        coupon.usage_limit = Some(limit);
    }

    ctx.store.save(&coupon)?;
    Ok(coupon)
}

/// Fetch one coupon. Admin only.
pub fn get_coupon(ctx: &AppContext, actor: &User, id: &str) -> Result<Coupon, ApiError> {
    require_admin(actor)?;
    ctx.store
        .get(id)?
        .ok_or_else(|| ApiError::NotFound(format!("Coupon not found: {}", id)))
}

/// Who redeemed a coupon, and when. Admin only.
pub fn coupon_redemptions(
    ctx: &AppContext,
    actor: &User,
    id: &str,
) -> Result<Vec<Redemption>, ApiError> {
    let coupon = get_coupon(ctx, actor, id)?;
    Ok(coupon.used_by)
}

/// Coupons a given user has redeemed. Admin only.
pub fn coupons_used_by_user(
    ctx: &AppContext,
    actor: &User,
    user_id: &str,
) -> Result<Vec<Coupon>, ApiError> {
    require_admin(actor)?;
    Ok(ctx.store.find(
        &Filter::new().eq("used_by.user", user_id),
        &FindOptions::new().sort_asc("code"),
    )?)
}

/// Enable or disable a coupon. Admin only.
pub fn set_coupon_active(
    ctx: &AppContext,
    actor: &User,
    id: &str,
    active: bool,
) -> Result<Coupon, ApiError> {
    require_admin(actor)?;
    let changed = ctx
        .store
        .update::<Coupon, _>(id, |coupon| coupon.is_active = active)?;
    if !changed {
        return Err(CommerceError::InvalidCoupon(id.to_string()).into());
    }
    ctx.store
        .get(id)?
        .ok_or_else(|| CommerceError::InvalidCoupon(id.to_string()).into())
}

/// Delete a coupon. Admin only.
pub fn delete_coupon(ctx: &AppContext, actor: &User, id: &str) -> Result<(), ApiError> {
    require_admin(actor)?;
    if !ctx.store.delete::<Coupon>(id)? {
        return Err(ApiError::NotFound(format!("Coupon not found: {}", id)));
    }
    tracing::info!(coupon = %id, "coupon deleted");
    Ok(())
}

/// List all coupons. Admin only.
pub fn list_coupons(ctx: &AppContext, actor: &User) -> Result<Vec<Coupon>, ApiError> {
    require_admin(actor)?;
    Ok(ctx
        .store
        .find(&Filter::new(), &FindOptions::new().sort_asc("code"))?)
}

pub(crate) fn find_by_code(ctx: &AppContext, code: &str) -> Result<Option<Coupon>, ApiError> {
    Ok(ctx
        .store
        .find_one(&filter! {"code" => code.to_uppercase()})?)
}
