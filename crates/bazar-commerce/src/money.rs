//! Money type for representing monetary values.
//!
//! Uses smallest-unit integer representation to avoid floating-point
//! precision issues that plague monetary calculations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    IRR,
    USD,
    EUR,
}

impl Currency {
    /// Get the currency code (e.g., "IRR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::IRR => "IRR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }

    /// Get the currency symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::IRR => "\u{fdfc}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::IRR => 0,
            _ => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "IRR" => Some(Currency::IRR),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (e.g., cents
/// for USD, whole rials for IRR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit.
    pub amount_minor: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from the smallest unit.
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a Money value from a decimal amount.
    ///
    /// ```
    /// use bazar_commerce::money::{Money, Currency};
    /// let price = Money::from_decimal(49.99, Currency::USD);
    /// assert_eq!(price.amount_minor, 4999);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        let multiplier = 10_i64.pow(currency.decimal_places());
        let amount_minor = (amount * multiplier as f64).round() as i64;
        Self::new(amount_minor, currency)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_minor > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        let divisor = 10_i64.pow(self.currency.decimal_places());
        self.amount_minor as f64 / divisor as f64
    }

    /// Format as a display string (e.g., "$49.99").
    pub fn display(&self) -> String {
        let decimal = self.to_decimal();
        let places = self.currency.decimal_places() as usize;
        format!("{}{:.places$}", self.currency.symbol(), decimal)
    }

    /// Try to add another Money value, returning None if currencies don't match
    /// or the sum overflows.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        let amount = self.amount_minor.checked_add(other.amount_minor)?;
        Some(Money::new(amount, self.currency))
    }

    /// Try to subtract another Money value.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        let amount = self.amount_minor.checked_sub(other.amount_minor)?;
        Some(Money::new(amount, self.currency))
    }

    /// Subtract another Money value, clamping the result at zero.
    ///
    /// Returns None only on currency mismatch.
    pub fn saturating_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        let amount = self.amount_minor.saturating_sub(other.amount_minor).max(0);
        Some(Money::new(amount, self.currency))
    }

    /// Try to multiply by a scalar, returning None on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        let amount = self.amount_minor.checked_mul(factor)?;
        Some(Money::new(amount, self.currency))
    }

    /// Calculate a percentage of this amount, rounding to the nearest unit.
    pub fn percentage(&self, percent: f64) -> Money {
        let amount = (self.amount_minor as f64 * percent / 100.0).round() as i64;
        Money::new(amount, self.currency)
    }

    /// Sum an iterator of Money values, returning None on mismatch or overflow.
    pub fn try_sum<'a>(
        iter: impl Iterator<Item = &'a Money>,
        currency: Currency,
    ) -> Option<Money> {
        let mut total = Money::zero(currency);
        for m in iter {
            total = total.try_add(m)?;
        }
        Some(total)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_minor_units() {
        let m = Money::new(4999, Currency::USD);
        assert_eq!(m.amount_minor, 4999);
        assert_eq!(m.currency, Currency::USD);
    }

    #[test]
    fn test_money_from_decimal() {
        let m = Money::from_decimal(49.99, Currency::USD);
        assert_eq!(m.amount_minor, 4999);

        let m = Money::from_decimal(250000.0, Currency::IRR);
        assert_eq!(m.amount_minor, 250000); // IRR has no decimals
    }

    #[test]
    fn test_money_display() {
        let m = Money::new(4999, Currency::USD);
        assert_eq!(m.display(), "$49.99");

        let m = Money::new(250000, Currency::IRR);
        assert_eq!(m.display(), "\u{fdfc}250000");
    }

    #[test]
    fn test_money_addition() {
        let a = Money::new(1000, Currency::IRR);
        let b = Money::new(500, Currency::IRR);
        let c = a.try_add(&b).unwrap();
        assert_eq!(c.amount_minor, 1500);
    }

    #[test]
    fn test_money_saturating_subtract() {
        let a = Money::new(300, Currency::IRR);
        let b = Money::new(1000, Currency::IRR);
        let c = a.saturating_subtract(&b).unwrap();
        assert_eq!(c.amount_minor, 0);
    }

    #[test]
    fn test_money_multiply() {
        let m = Money::new(1000, Currency::IRR);
        let tripled = m.try_multiply(3).unwrap();
        assert_eq!(tripled.amount_minor, 3000);
    }

    #[test]
    fn test_money_percentage() {
        let m = Money::new(10000, Currency::IRR);
        let discount = m.percentage(10.0);
        assert_eq!(discount.amount_minor, 1000);
    }

    #[test]
    fn test_money_currency_mismatch() {
        let usd = Money::new(1000, Currency::USD);
        let eur = Money::new(1000, Currency::EUR);
        assert!(usd.try_add(&eur).is_none());
    }

    #[test]
    fn test_money_overflow() {
        let m = Money::new(i64::MAX, Currency::IRR);
        assert!(m.try_add(&Money::new(1, Currency::IRR)).is_none());
        assert!(m.try_multiply(2).is_none());
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("IRR"), Some(Currency::IRR));
        assert_eq!(Currency::from_code("usd"), Some(Currency::USD));
        assert_eq!(Currency::from_code("INVALID"), None);
    }
}
