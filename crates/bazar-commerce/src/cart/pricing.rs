//! Cart pricing calculations.

use crate::cart::{CouponValue, LineItem};
use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Pricing breakdown for a cart, derived on every read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartTotals {
    /// Sum of quantity * unit price over all lines.
    pub subtotal: Money,
    /// Discount granted by the applied coupon.
    pub discount: Money,
    /// Subtotal minus discount, clamped at zero.
    pub total: Money,
    /// Sum of line quantities.
    pub item_count: i64,
}

impl CartTotals {
    /// Check if a discount is applied.
    pub fn has_discount(&self) -> bool {
        self.discount.is_positive()
    }
}

/// Compute cart totals from lines and an optional coupon value.
///
/// The discount is recomputed against the current subtotal, so a
/// percentage coupon tracks cart edits made after it was applied.
pub fn compute_totals(
    items: &[LineItem],
    coupon: Option<&CouponValue>,
) -> Result<CartTotals, CommerceError> {
    let currency = items
        .first()
        .map(|i| i.unit_price.currency)
        .unwrap_or_default();

    let mut subtotal = Money::zero(currency);
    for item in items {
        let line_total = item
            .unit_price
            .try_multiply(item.quantity)
            .ok_or(CommerceError::Overflow)?;
        subtotal = subtotal
            .try_add(&line_total)
            .ok_or_else(|| currency_mismatch(currency, line_total.currency))?;
    }

    let discount = match coupon {
        Some(value) => value.discount_for(&subtotal)?,
        None => Money::zero(currency),
    };

    let total = subtotal
        .saturating_subtract(&discount)
        .ok_or_else(|| currency_mismatch(currency, discount.currency))?;

    Ok(CartTotals {
        subtotal,
        discount,
        total,
        item_count: items.iter().map(|i| i.quantity).sum(),
    })
}

fn currency_mismatch(expected: Currency, got: Currency) -> CommerceError {
    CommerceError::CurrencyMismatch {
        expected: expected.code().to_string(),
        got: got.code().to_string(),
    }
}
