//! Domain model for the bazar shop backend.
//!
//! This crate holds the pure domain types and rules: catalog entities
//! (products, categories, brands), the shopping cart with coupon
//! pricing, orders with their state machine, and site content (blog
//! posts, contact messages). Persistence lives in `bazar-store`; the
//! HTTP-facing services live in `bazar-api`.
//!
//! All monetary amounts use [`money::Money`], an integer smallest-unit
//! representation. Cart totals are never stored; they are derived on
//! every read.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod content;
pub mod error;
pub mod ids;
pub mod money;

pub use cart::{AppliedCoupon, Cart, CartTotals, Coupon, CouponValue, LineItem, Redemption};
pub use catalog::{Brand, Category, CategoryKind, CategoryNode, Product, Rating};
pub use checkout::{
    Address, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress,
};
pub use content::{Blog, Contact, ContactStatus};
pub use error::CommerceError;
pub use ids::{
    AddressId, BlogId, BrandId, CartId, CategoryId, ContactId, CouponId, OrderId, ProductId,
    UserId,
};
pub use money::{Currency, Money};
