//! Shopping cart: line items, coupons, and pricing.

mod cart;
mod coupon;
mod pricing;

pub use cart::{AppliedCoupon, Cart, LineItem, MAX_QUANTITY_PER_ITEM};
pub use coupon::{Coupon, CouponValue, Redemption};
pub use pricing::{compute_totals, CartTotals};
