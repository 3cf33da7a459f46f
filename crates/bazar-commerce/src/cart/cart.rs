//! Cart and line item types.

use crate::cart::{compute_totals, CartTotals, CouponValue};
use crate::error::CommerceError;
use crate::ids::{CartId, CouponId, ProductId, UserId};
use crate::money::Money;
use bazar_store::Document;
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// A shopping cart. One per user.
///
/// Totals are never stored; they are derived from the items and the
/// applied coupon on every read via [`Cart::totals`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Unique cart identifier.
    pub id: CartId,
    /// Owning user.
    pub user: UserId,
    /// Items in the cart.
    pub items: Vec<LineItem>,
    /// Coupon applied to the cart, if any.
    pub applied_coupon: Option<AppliedCoupon>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Document for Cart {
    const COLLECTION: &'static str = "carts";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Cart {
    /// Create an empty cart for a user.
    pub fn new(user: UserId) -> Self {
        let now = current_timestamp();
        Self {
            id: CartId::generate(),
            user,
            items: Vec::new(),
            applied_coupon: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add an item to the cart.
    ///
    /// Lines are keyed by product and color: adding the same product in
    /// the same color merges quantities, a different color opens a new
    /// line. The unit price snapshot of a merged line is refreshed.
    pub fn add_item(
        &mut self,
        product: ProductId,
        title: impl Into<String>,
        quantity: i64,
        unit_price: Money,
        color: Option<String>,
    ) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product == product && i.color == color)
        {
            let new_quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;

            if new_quantity > MAX_QUANTITY_PER_ITEM {
                return Err(CommerceError::QuantityExceedsLimit(
                    new_quantity,
                    MAX_QUANTITY_PER_ITEM,
                ));
            }

            existing.quantity = new_quantity;
            existing.unit_price = unit_price;
            self.updated_at = current_timestamp();
            return Ok(());
        }

        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        self.items.push(LineItem {
            product,
            title: title.into(),
            quantity,
            unit_price,
            color,
        });
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of zero or less removes the line. Errors if no line
    /// matches the product and color.
    pub fn set_quantity(
        &mut self,
        product: &ProductId,
        color: Option<&str>,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        let index = self
            .items
            .iter()
            .position(|i| &i.product == product && i.color.as_deref() == color)
            .ok_or_else(|| CommerceError::ItemNotInCart(product.to_string()))?;

        if quantity <= 0 {
            self.items.remove(index);
        } else if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        } else {
            self.items[index].quantity = quantity;
        }
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Remove a line from the cart. Removing an absent line is a no-op.
    pub fn remove_item(&mut self, product: &ProductId, color: Option<&str>) -> bool {
        let len_before = self.items.len();
        self.items
            .retain(|i| !(&i.product == product && i.color.as_deref() == color));
        let removed = self.items.len() < len_before;
        if removed {
            self.updated_at = current_timestamp();
        }
        removed
    }

    /// Clear all items and any applied coupon.
    pub fn clear(&mut self) {
        self.items.clear();
        self.applied_coupon = None;
        self.updated_at = current_timestamp();
    }

    /// Attach a coupon to the cart, replacing any previous one.
    pub fn apply_coupon(&mut self, coupon: AppliedCoupon) {
        self.applied_coupon = Some(coupon);
        self.updated_at = current_timestamp();
    }

    /// Detach the applied coupon, if any.
    pub fn remove_coupon(&mut self) -> bool {
        let removed = self.applied_coupon.take().is_some();
        if removed {
            self.updated_at = current_timestamp();
        }
        removed
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get a line by product and color.
    pub fn get_item(&self, product: &ProductId, color: Option<&str>) -> Option<&LineItem> {
        self.items
            .iter()
            .find(|i| &i.product == product && i.color.as_deref() == color)
    }

    /// Compute the current totals from items and the applied coupon.
    pub fn totals(&self) -> Result<CartTotals, CommerceError> {
        compute_totals(
            &self.items,
            self.applied_coupon.as_ref().map(|c| &c.value),
        )
    }
}

/// Snapshot of a coupon at the moment it was applied to a cart.
///
/// The value is copied so the cart keeps pricing consistently even if
/// the coupon definition is edited later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedCoupon {
    /// The coupon that was redeemed.
    pub coupon: CouponId,
    /// Coupon code, denormalized for display.
    pub code: String,
    /// Discount value at redemption time.
    pub value: CouponValue,
}

/// A line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Product being purchased.
    pub product: ProductId,
    /// Product title (denormalized for display).
    pub title: String,
    /// Quantity.
    pub quantity: i64,
    /// Unit price at the time the line was added.
    pub unit_price: Money,
    /// Chosen color, if the product has variants.
    pub color: Option<String>,
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
