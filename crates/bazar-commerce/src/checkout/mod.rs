//! Checkout: addresses and orders.

mod address;
mod order;

pub use address::{Address, ShippingAddress};
pub use order::{Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus};
