//! Cart operations and coupon redemption.

use crate::context::AppContext;
use crate::services::current_timestamp;
use crate::ApiError;
use bazar_auth::User;
use bazar_commerce::{
    AppliedCoupon, Cart, CartTotals, CommerceError, Coupon, Product, ProductId,
};
use bazar_store::filter;
use serde::Serialize;

/// A cart together with its freshly computed totals.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    #[serde(flatten)]
    pub cart: Cart,
    pub totals: CartTotals,
}

impl CartView {
    fn of(cart: Cart) -> Result<Self, ApiError> {
        let totals = cart.totals()?;
        Ok(Self { cart, totals })
    }
}

/// Fetch the caller's cart, creating an empty one on first touch.
pub fn get_cart(ctx: &AppContext, actor: &User) -> Result<CartView, ApiError> {
    CartView::of(get_or_create(ctx, actor)?)
}

/// Add a product to the caller's cart.
///
/// The line snapshots the current title and price; the same product in
/// the same color merges with the existing line.
pub fn add_to_cart(
    ctx: &AppContext,
    actor: &User,
    product_id: &ProductId,
    quantity: i64,
    color: Option<String>,
) -> Result<CartView, ApiError> {
    let product: Product = ctx
        .store
        .get(product_id.as_str())?
        .ok_or_else(|| CommerceError::ProductNotFound(product_id.to_string()))?;

    if let Some(color) = &color {
        if !product.colors.is_empty() && !product.colors.contains(color) {
            return Err(ApiError::Validation(format!(
                "Color not offered for this product: {}",
                color
            )));
        }
    }

    let mut cart = get_or_create(ctx, actor)?;
    cart.add_item(
        product.id.clone(),
        product.title.clone(),
        quantity,
        product.price,
        color,
    )?;
    ctx.store.save(&cart)?;
    CartView::of(cart)
}

/// Set the quantity of a line. Zero removes it.
pub fn set_item_quantity(
    ctx: &AppContext,
    actor: &User,
    product_id: &ProductId,
    color: Option<&str>,
    quantity: i64,
) -> Result<CartView, ApiError> {
    let mut cart = get_or_create(ctx, actor)?;
    cart.set_quantity(product_id, color, quantity)?;
    ctx.store.save(&cart)?;
    CartView::of(cart)
}

/// Remove a line. Removing an absent line is a no-op.
pub fn remove_from_cart(
    ctx: &AppContext,
    actor: &User,
    product_id: &ProductId,
    color: Option<&str>,
) -> Result<CartView, ApiError> {
    let mut cart = get_or_create(ctx, actor)?;
    cart.remove_item(product_id, color);
    ctx.store.save(&cart)?;
    CartView::of(cart)
}

/// Empty the caller's cart, dropping any applied coupon.
pub fn clear_cart(ctx: &AppContext, actor: &User) -> Result<CartView, ApiError> {
    let mut cart = get_or_create(ctx, actor)?;
    cart.clear();
    ctx.store.save(&cart)?;
    CartView::of(cart)
}

/// Redeem a coupon against the caller's cart.
///
/// Eligibility, the usage counter, and the cart update commit together;
/// a failure on any step leaves both documents untouched. Every
/// ineligible coupon gets the same rejection, whatever the blocker, so
/// the response does not reveal whether a code exists, has expired, or
/// was already used.
pub fn apply_coupon(ctx: &AppContext, actor: &User, code: &str) -> Result<CartView, ApiError> {
    let code = code.trim().to_uppercase();
    let now = current_timestamp();
    let user = actor.id.clone();

    let cart = ctx.store.transaction::<_, ApiError, _>(|tx| {
        let mut cart: Cart = tx
            .find_one(&filter! {"user" => user.as_str()})?
            .ok_or(CommerceError::EmptyCart)?;
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart.into());
        }

        let mut coupon: Coupon = tx
            .find_one(&filter! {"code" => code.as_str()})?
            .ok_or_else(coupon_rejected)?;

        if coupon.check_redeemable(&user, now).is_err() {
            return Err(coupon_rejected());
        }
        coupon.record_redemption(user.clone());
        tx.save(&coupon)?;

        cart.apply_coupon(AppliedCoupon {
            coupon: coupon.id.clone(),
            code: coupon.code.clone(),
            value: coupon.value.clone(),
        });
        tx.save(&cart)?;
        Ok(cart)
    })?;

    tracing::info!(user = %user, code = %code, "coupon applied");
    CartView::of(cart)
}

/// Detach the applied coupon from the cart.
///
/// The redemption stays consumed; coupons are single-use per user.
pub fn remove_coupon(ctx: &AppContext, actor: &User) -> Result<CartView, ApiError> {
    let mut cart = get_or_create(ctx, actor)?;
    cart.remove_coupon();
    ctx.store.save(&cart)?;
    CartView::of(cart)
}

fn coupon_rejected() -> ApiError {
    ApiError::Validation("Coupon is invalid or expired".to_string())
}

pub(crate) fn get_or_create(ctx: &AppContext, actor: &User) -> Result<Cart, ApiError> {
    if let Some(cart) = ctx
        .store
        .find_one::<Cart>(&filter! {"user" => actor.id.as_str()})?
    {
        return Ok(cart);
    }
    let cart = Cart::new(actor.id.clone());
    ctx.store.insert(&cart)?;
    Ok(cart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil::{seed_user, test_ctx};
    use bazar_commerce::{Currency, Money};

    fn seed_product(ctx: &AppContext, title: &str, price: i64, quantity: i64) -> Product {
        let product = Product::new(title, Money::new(price, Currency::IRR)).with_quantity(quantity);
        ctx.store.insert(&product).unwrap();
        product
    }

    fn seed_coupon(ctx: &AppContext, code: &str, percent: f64) -> Coupon {
        let coupon = Coupon::new(code, bazar_commerce::CouponValue::Percentage(percent));
        ctx.store.insert(&coupon).unwrap();
        coupon
    }

    #[test]
    fn test_first_touch_creates_empty_cart() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        let view = get_cart(&ctx, &user).unwrap();
        assert!(view.cart.is_empty());
        assert!(view.totals.subtotal.is_zero());
    }

    #[test]
    fn test_add_snapshots_price() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        let product = seed_product(&ctx, "Phone", 1000, 5);

        let view = add_to_cart(&ctx, &user, &product.id, 2, None).unwrap();
        assert_eq!(view.totals.subtotal.amount_minor, 2000);

        // A later price change does not touch the cart line.
        ctx.store
            .update::<Product, _>(product.id.as_str(), |p| {
                p.price = Money::new(9999, Currency::IRR)
            })
            .unwrap();
        let view = get_cart(&ctx, &user).unwrap();
        assert_eq!(view.totals.subtotal.amount_minor, 2000);
    }

    #[test]
    fn test_unknown_product_rejected() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        assert!(matches!(
            add_to_cart(&ctx, &user, &ProductId::new("nope"), 1, None),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_color_must_be_offered() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        let mut product = Product::new("Phone", Money::new(1000, Currency::IRR));
        product.colors = vec!["black".into(), "white".into()];
        ctx.store.insert(&product).unwrap();

        assert!(add_to_cart(&ctx, &user, &product.id, 1, Some("black".into())).is_ok());
        assert!(matches!(
            add_to_cart(&ctx, &user, &product.id, 1, Some("green".into())),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_quantity_update_and_removal() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        let product = seed_product(&ctx, "Phone", 1000, 5);

        add_to_cart(&ctx, &user, &product.id, 1, None).unwrap();
        let view = set_item_quantity(&ctx, &user, &product.id, None, 4).unwrap();
        assert_eq!(view.totals.item_count, 4);

        let view = remove_from_cart(&ctx, &user, &product.id, None).unwrap();
        assert!(view.cart.is_empty());
        // Idempotent.
        assert!(remove_from_cart(&ctx, &user, &product.id, None).is_ok());
    }

    #[test]
    fn test_apply_coupon_discounts_cart() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        let product = seed_product(&ctx, "Phone", 1000, 5);
        seed_coupon(&ctx, "SAVE10", 10.0);

        add_to_cart(&ctx, &user, &product.id, 2, None).unwrap();
        let view = apply_coupon(&ctx, &user, "save10").unwrap();
        assert_eq!(view.totals.discount.amount_minor, 200);
        assert_eq!(view.totals.total.amount_minor, 1800);
    }

    #[test]
    fn test_coupon_discount_follows_cart_edits() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        let product = seed_product(&ctx, "Phone", 1000, 9);
        seed_coupon(&ctx, "SAVE10", 10.0);

        add_to_cart(&ctx, &user, &product.id, 2, None).unwrap();
        apply_coupon(&ctx, &user, "SAVE10").unwrap();

        let view = set_item_quantity(&ctx, &user, &product.id, None, 5).unwrap();
        assert_eq!(view.totals.subtotal.amount_minor, 5000);
        assert_eq!(view.totals.discount.amount_minor, 500);
    }

    #[test]
    fn test_apply_on_empty_cart_rejected() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        seed_coupon(&ctx, "SAVE10", 10.0);
        get_cart(&ctx, &user).unwrap();

        assert!(matches!(
            apply_coupon(&ctx, &user, "SAVE10"),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_failed_redemption_leaves_counter_untouched() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        let product = seed_product(&ctx, "Phone", 1000, 5);
        let coupon = seed_coupon(&ctx, "SAVE10", 10.0);
        ctx.store
            .update::<Coupon, _>(coupon.id.as_str(), |c| c.is_active = false)
            .unwrap();

        add_to_cart(&ctx, &user, &product.id, 1, None).unwrap();
        assert!(apply_coupon(&ctx, &user, "SAVE10").is_err());

        let stored: Coupon = ctx.store.get(coupon.id.as_str()).unwrap().unwrap();
        assert_eq!(stored.used_count, 0);
        assert!(stored.used_by.is_empty());
    }

    #[test]
    fn test_coupon_single_use_per_user() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        let other = seed_user(&ctx, "b@example.com");
        let product = seed_product(&ctx, "Phone", 1000, 9);
        seed_coupon(&ctx, "SAVE10", 10.0);

        add_to_cart(&ctx, &user, &product.id, 1, None).unwrap();
        apply_coupon(&ctx, &user, "SAVE10").unwrap();
        assert!(matches!(
            apply_coupon(&ctx, &user, "SAVE10"),
            Err(ApiError::Validation(_))
        ));

        // A different user still can.
        add_to_cart(&ctx, &other, &product.id, 1, None).unwrap();
        assert!(apply_coupon(&ctx, &other, "SAVE10").is_ok());
    }

    #[test]
    fn test_rejection_does_not_reveal_blocker() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        let product = seed_product(&ctx, "Phone", 1000, 9);

        let inactive = seed_coupon(&ctx, "OFF", 10.0);
        ctx.store
            .update::<Coupon, _>(inactive.id.as_str(), |c| c.is_active = false)
            .unwrap();
        let expired = Coupon::new("GONE", bazar_commerce::CouponValue::Percentage(10.0))
            .with_expiry(1);
        ctx.store.insert(&expired).unwrap();
        seed_coupon(&ctx, "TAKEN", 10.0);

        add_to_cart(&ctx, &user, &product.id, 1, None).unwrap();
        apply_coupon(&ctx, &user, "TAKEN").unwrap();

        let mut messages = Vec::new();
        for code in ["OFF", "GONE", "TAKEN", "NO-SUCH-CODE"] {
            match apply_coupon(&ctx, &user, code) {
                Err(e @ ApiError::Validation(_)) => messages.push(e.to_string()),
                other => panic!("expected uniform rejection for {}, got {:?}", code, other.err()),
            }
        }
        assert!(messages.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_remove_coupon_keeps_redemption() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        let product = seed_product(&ctx, "Phone", 1000, 5);
        let coupon = seed_coupon(&ctx, "SAVE10", 10.0);

        add_to_cart(&ctx, &user, &product.id, 1, None).unwrap();
        apply_coupon(&ctx, &user, "SAVE10").unwrap();
        let view = remove_coupon(&ctx, &user).unwrap();
        assert!(view.cart.applied_coupon.is_none());
        assert!(view.totals.discount.is_zero());

        let stored: Coupon = ctx.store.get(coupon.id.as_str()).unwrap().unwrap();
        assert_eq!(stored.used_count, 1);
    }
}
