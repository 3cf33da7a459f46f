//! Address book entries and shipping snapshots.

use crate::ids::{AddressId, UserId};
use bazar_store::Document;
use serde::{Deserialize, Serialize};

/// A saved address in a user's address book.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Address {
    /// Unique address identifier.
    pub id: AddressId,
    /// Owning user.
    pub user: UserId,
    /// Recipient full name.
    pub full_name: String,
    /// Recipient phone number.
    pub phone: String,
    /// Province.
    pub province: String,
    /// City.
    pub city: String,
    /// Street address.
    pub address_line: String,
    /// Postal code.
    pub postal_code: String,
    /// Building number.
    pub plaque: Option<String>,
    /// Unit number.
    pub unit: Option<String>,
    /// Whether this is the user's default shipping address.
    pub is_default: bool,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Document for Address {
    const COLLECTION: &'static str = "addresses";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Address {
    /// Create a new non-default address for a user.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user: UserId,
        full_name: impl Into<String>,
        phone: impl Into<String>,
        province: impl Into<String>,
        city: impl Into<String>,
        address_line: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        let now = current_timestamp();
        Self {
            id: AddressId::generate(),
            user,
            full_name: full_name.into(),
            phone: phone.into(),
            province: province.into(),
            city: city.into(),
            address_line: address_line.into(),
            postal_code: postal_code.into(),
            plaque: None,
            unit: None,
            is_default: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Take a shipping snapshot of this address.
    pub fn to_shipping(&self) -> ShippingAddress {
        ShippingAddress {
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            province: self.province.clone(),
            city: self.city.clone(),
            address_line: self.address_line.clone(),
            postal_code: self.postal_code.clone(),
            plaque: self.plaque.clone(),
            unit: self.unit.clone(),
        }
    }
}

/// Shipping destination frozen into an order at placement time.
///
/// Copied by value so later edits to the address book never change
/// where an already-placed order ships.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub province: String,
    pub city: String,
    pub address_line: String,
    pub postal_code: String,
    pub plaque: Option<String>,
    pub unit: Option<String>,
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
