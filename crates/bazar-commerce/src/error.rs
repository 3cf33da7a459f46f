//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in shop domain operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Brand not found.
    #[error("Brand not found: {0}")]
    BrandNotFound(String),

    /// Cart not found.
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Item not in cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Cart has no items.
    #[error("Cart is empty")]
    EmptyCart,

    /// Not enough stock to cover the requested quantity.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: i64,
        available: i64,
    },

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Invalid order state transition.
    #[error("Invalid order transition from {from} to {to}")]
    InvalidOrderTransition { from: String, to: String },

    /// Coupon code does not exist or is disabled.
    #[error("Invalid coupon code: {0}")]
    InvalidCoupon(String),

    /// Coupon expired.
    #[error("Coupon expired: {0}")]
    CouponExpired(String),

    /// Coupon usage limit reached.
    #[error("Coupon usage limit reached: {0}")]
    CouponUsageLimitReached(String),

    /// Coupon already redeemed by this user.
    #[error("Coupon already used: {0}")]
    CouponAlreadyUsed(String),

    /// A category points at one of its own descendants.
    #[error("Corrupt category hierarchy at: {0}")]
    CorruptHierarchy(String),

    /// Parent category kind does not match the child's.
    #[error("Category kind mismatch: parent {parent} vs child {child}")]
    CategoryKindMismatch { parent: String, child: String },

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Storage error.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<bazar_store::StoreError> for CommerceError {
    fn from(e: bazar_store::StoreError) -> Self {
        CommerceError::StorageError(e.to_string())
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
