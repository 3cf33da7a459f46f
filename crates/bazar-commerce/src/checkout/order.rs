//! Order types and state transitions.

use crate::checkout::ShippingAddress;
use crate::error::CommerceError;
use crate::ids::{OrderId, ProductId, UserId};
use crate::money::Money;
use bazar_store::Document;
use serde::{Deserialize, Serialize};

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Online gateway payment.
    Online,
    /// Cash on delivery.
    Cod,
}

impl PaymentMethod {
    /// Get the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "online",
            PaymentMethod::Cod => "cod",
        }
    }

    /// Parse a method string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "online" => Some(PaymentMethod::Online),
            "cod" => Some(PaymentMethod::Cod),
            _ => None,
        }
    }
}

/// Whether and how the payment settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Get the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

/// Lifecycle of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, not yet picked up by fulfilment.
    Pending,
    /// Being prepared.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Cancelled; stock was returned.
    Cancelled,
}

impl OrderStatus {
    /// Get the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a status string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "processing" => Some(OrderStatus::Processing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Check if an order in this status may still be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Processing | OrderStatus::Shipped
        )
    }

    /// Check if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// A placed order.
///
/// Items, prices, and the shipping address are snapshots taken at
/// placement time; later catalog or address edits do not touch them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// User who placed the order.
    pub user: UserId,
    /// Purchased items.
    pub items: Vec<OrderItem>,
    /// Where the order ships.
    pub shipping_address: ShippingAddress,
    /// Subtotal at placement time.
    pub subtotal: Money,
    /// Discount granted at placement time.
    pub discount: Money,
    /// Amount due.
    pub total: Money,
    /// Coupon code redeemed on this order, if any.
    pub coupon_code: Option<String>,
    /// How the customer pays.
    pub payment_method: PaymentMethod,
    /// Whether payment has settled.
    pub payment_status: PaymentStatus,
    /// Unix timestamp of payment, once paid.
    pub paid_at: Option<i64>,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Carrier tracking code, set when shipped.
    pub tracking_code: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Document for Order {
    const COLLECTION: &'static str = "orders";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Order {
    /// Mark the order as paid, stamping the payment time.
    pub fn mark_paid(&mut self) -> Result<(), CommerceError> {
        self.payment_transition(PaymentStatus::Paid)?;
        self.paid_at = Some(current_timestamp());
        Ok(())
    }

    /// Record a failed payment attempt.
    pub fn fail_payment(&mut self) -> Result<(), CommerceError> {
        self.payment_transition(PaymentStatus::Failed)
    }

    /// Refund a settled payment.
    pub fn refund_payment(&mut self) -> Result<(), CommerceError> {
        self.payment_transition(PaymentStatus::Refunded)
    }

    /// Start fulfilment.
    pub fn mark_processing(&mut self) -> Result<(), CommerceError> {
        self.transition(OrderStatus::Processing)
    }

    /// Hand the order to the carrier with a tracking code.
    pub fn mark_shipped(&mut self, tracking_code: impl Into<String>) -> Result<(), CommerceError> {
        self.transition(OrderStatus::Shipped)?;
        self.tracking_code = Some(tracking_code.into());
        Ok(())
    }

    /// Mark the order as delivered.
    pub fn mark_delivered(&mut self) -> Result<(), CommerceError> {
        self.transition(OrderStatus::Delivered)
    }

    /// Cancel the order. The caller is responsible for returning stock.
    pub fn cancel(&mut self) -> Result<(), CommerceError> {
        if !self.status.can_cancel() {
            return Err(self.bad_transition(OrderStatus::Cancelled));
        }
        self.status = OrderStatus::Cancelled;
        self.updated_at = current_timestamp();
        Ok(())
    }

    fn transition(&mut self, to: OrderStatus) -> Result<(), CommerceError> {
        let allowed = matches!(
            (self.status, to),
            (OrderStatus::Pending, OrderStatus::Processing)
                | (OrderStatus::Processing, OrderStatus::Shipped)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
        );
        if !allowed {
            return Err(self.bad_transition(to));
        }
        self.status = to;
        self.updated_at = current_timestamp();
        Ok(())
    }

    fn payment_transition(&mut self, to: PaymentStatus) -> Result<(), CommerceError> {
        let allowed = matches!(
            (self.payment_status, to),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
        );
        if !allowed {
            return Err(CommerceError::InvalidOrderTransition {
                from: self.payment_status.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        self.payment_status = to;
        self.updated_at = current_timestamp();
        Ok(())
    }

    fn bad_transition(&self, to: OrderStatus) -> CommerceError {
        CommerceError::InvalidOrderTransition {
            from: self.status.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }
}

/// A purchased item, frozen at placement time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Product that was purchased.
    pub product: ProductId,
    /// Product title at placement time.
    pub title: String,
    /// Quantity purchased.
    pub quantity: i64,
    /// Unit price at placement time.
    pub unit_price: Money,
    /// Chosen color, if any.
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
