//! Address book management.

use crate::context::AppContext;
use crate::services::current_timestamp;
use crate::ApiError;
use bazar_auth::User;
use bazar_commerce::Address;
use bazar_store::{filter, FindOptions};
use serde::Deserialize;

/// Input for [`create_address`].
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAddressInput {
    pub full_name: String,
    pub phone: String,
    pub province: String,
    pub city: String,
    pub address_line: String,
    pub postal_code: String,
    pub plaque: Option<String>,
    pub unit: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// Partial update for [`update_address`]. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAddressInput {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub address_line: Option<String>,
    pub postal_code: Option<String>,
    pub plaque: Option<String>,
    pub unit: Option<String>,
}

/// Add an address to the caller's address book.
pub fn create_address(
    ctx: &AppContext,
    actor: &User,
    input: CreateAddressInput,
) -> Result<Address, ApiError> {
    for (field, value) in [
        ("full_name", &input.full_name),
        ("phone", &input.phone),
        ("province", &input.province),
        ("city", &input.city),
        ("address_line", &input.address_line),
        ("postal_code", &input.postal_code),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::Validation(format!("{} is required", field)));
        }
    }

    let mut address = Address::new(
        actor.id.clone(),
        input.full_name,
        input.phone,
        input.province,
        input.city,
        input.address_line,
        input.postal_code,
    );
    address.plaque = input.plaque;
    address.unit = input.unit;

    if input.is_default {
        unset_default(ctx, actor)?;
        address.is_default = true;
    }
    ctx.store.insert(&address)?;

    tracing::info!(address = %address.id, user = %actor.id, "address created");
    Ok(address)
}

/// Edit an address the caller owns.
pub fn update_address(
    ctx: &AppContext,
    actor: &User,
    id: &str,
    input: UpdateAddressInput,
) -> Result<Address, ApiError> {
    let mut address = load_owned(ctx, actor, id)?;

    if let Some(full_name) = input.full_name {
        address.full_name = full_name;
    }
    if let Some(phone) = input.phone {
        address.phone = phone;
    }
    if let Some(province) = input.province {
        address.province = province;
    }
    if let Some(city) = input.city {
        address.city = city;
    }
    if let Some(address_line) = input.address_line {
        address.address_line = address_line;
    }
    if let Some(postal_code) = input.postal_code {
        address.postal_code = postal_code;
    }
    if input.plaque.is_some() {
        address.plaque = input.plaque;
    }
    if input.unit.is_some() {
        address.unit = input.unit;
    }
    address.updated_at = current_timestamp();

    ctx.store.save(&address)?;
    Ok(address)
}

/// Remove an address the caller owns.
pub fn delete_address(ctx: &AppContext, actor: &User, id: &str) -> Result<(), ApiError> {
    let address = load_owned(ctx, actor, id)?;
    ctx.store.delete::<Address>(address.id.as_str())?;
    tracing::info!(address = %id, user = %actor.id, "address deleted");
    Ok(())
}

/// Make one of the caller's addresses the default, demoting the rest.
pub fn set_default_address(
    ctx: &AppContext,
    actor: &User,
    id: &str,
) -> Result<Address, ApiError> {
    let mut address = load_owned(ctx, actor, id)?;
    unset_default(ctx, actor)?;
    address.is_default = true;
    address.updated_at = current_timestamp();
    ctx.store.save(&address)?;
    Ok(address)
}

/// Fetch one address the caller owns.
pub fn get_address(ctx: &AppContext, actor: &User, id: &str) -> Result<Address, ApiError> {
    load_owned(ctx, actor, id)
}

/// List the caller's addresses, default first.
pub fn list_addresses(ctx: &AppContext, actor: &User) -> Result<Vec<Address>, ApiError> {
    let mut addresses: Vec<Address> = ctx.store.find(
        &filter! {"user" => actor.id.as_str()},
        &FindOptions::new().sort_asc("created_at"),
    )?;
    addresses.sort_by_key(|a| !a.is_default);
    Ok(addresses)
}

fn load_owned(ctx: &AppContext, actor: &User, id: &str) -> Result<Address, ApiError> {
    let address: Address = ctx
        .store
        .get(id)?
        .ok_or_else(|| ApiError::NotFound(format!("Address not found: {}", id)))?;
    if address.user != actor.id {
        return Err(ApiError::Forbidden("Not your address".to_string()));
    }
    Ok(address)
}

fn unset_default(ctx: &AppContext, actor: &User) -> Result<(), ApiError> {
    let defaults: Vec<Address> = ctx.store.find(
        &filter! {"user" => actor.id.as_str(), "is_default" => true},
        &FindOptions::new(),
    )?;
    for mut address in defaults {
        address.is_default = false;
        ctx.store.save(&address)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil::{seed_user, test_ctx};

    fn input(city: &str, is_default: bool) -> CreateAddressInput {
        CreateAddressInput {
            full_name: "Sara Ahmadi".into(),
            phone: "09120000000".into(),
            province: "Tehran".into(),
            city: city.into(),
            address_line: "Valiasr St 12".into(),
            postal_code: "1234567890".into(),
            plaque: None,
            unit: None,
            is_default,
        }
    }

    #[test]
    fn test_create_requires_fields() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        let mut bad = input("Tehran", false);
        bad.postal_code = "  ".into();
        assert!(matches!(
            create_address(&ctx, &user, bad),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_single_default_per_user() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        let home = create_address(&ctx, &user, input("Tehran", true)).unwrap();
        let work = create_address(&ctx, &user, input("Karaj", true)).unwrap();

        let addresses = list_addresses(&ctx, &user).unwrap();
        assert_eq!(addresses.len(), 2);
        assert_eq!(addresses[0].id, work.id);
        assert!(addresses[0].is_default);
        assert!(!addresses[1].is_default);

        let promoted = set_default_address(&ctx, &user, home.id.as_str()).unwrap();
        assert!(promoted.is_default);
        let stored: Address = ctx.store.get(work.id.as_str()).unwrap().unwrap();
        assert!(!stored.is_default);
    }

    #[test]
    fn test_update_keeps_absent_fields() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        let address = create_address(&ctx, &user, input("Tehran", false)).unwrap();

        let updated = update_address(
            &ctx,
            &user,
            address.id.as_str(),
            UpdateAddressInput {
                city: Some("Shiraz".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.city, "Shiraz");
        assert_eq!(updated.full_name, "Sara Ahmadi");
    }

    #[test]
    fn test_ownership_enforced() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        let other = seed_user(&ctx, "b@example.com");
        let address = create_address(&ctx, &user, input("Tehran", false)).unwrap();

        assert!(matches!(
            delete_address(&ctx, &other, address.id.as_str()),
            Err(ApiError::Forbidden(_))
        ));
        assert!(delete_address(&ctx, &user, address.id.as_str()).is_ok());
        assert!(list_addresses(&ctx, &user).unwrap().is_empty());
    }
}
