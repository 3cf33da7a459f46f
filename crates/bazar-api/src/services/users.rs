//! User profiles, administration, and wishlists.

use crate::context::AppContext;
use crate::services::{require_admin, Pagination};
use crate::ApiError;
use bazar_auth::{hash_password, validate_strength, verify_password, AuthError, Role, User};
use bazar_commerce::{CommerceError, Product, ProductId};
use bazar_store::{filter, Filter, FindOptions};
use serde::Deserialize;

/// Input for [`update_profile`].
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// List all users, newest first. Admin only.
pub fn list_users(ctx: &AppContext, actor: &User, page: Pagination) -> Result<Vec<User>, ApiError> {
    require_admin(actor)?;
    let options = page.apply(FindOptions::new().sort_desc("created_at"));
    Ok(ctx.store.find(&Filter::new(), &options)?)
}

/// Fetch one user. Admins can fetch anyone; users only themselves.
pub fn get_user(ctx: &AppContext, actor: &User, id: &str) -> Result<User, ApiError> {
    if !actor.is_admin() && actor.id.as_str() != id {
        return Err(ApiError::Forbidden("Cannot view other users".to_string()));
    }
    ctx.store
        .get(id)?
        .ok_or_else(|| AuthError::UserNotFound(id.to_string()).into())
}

/// Update the caller's own name fields.
pub fn update_profile(
    ctx: &AppContext,
    actor: &User,
    input: UpdateProfileInput,
) -> Result<User, ApiError> {
    let mut user: User = ctx
        .store
        .get(actor.id.as_str())?
        .ok_or_else(|| AuthError::UserNotFound(actor.id.to_string()))?;

    if let Some(first_name) = input.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = input.last_name {
        user.last_name = last_name;
    }
    ctx.store.save(&user)?;
    Ok(user)
}

/// Change the caller's password, verifying the current one first.
pub fn change_password(
    ctx: &AppContext,
    actor: &User,
    current: &str,
    new_password: &str,
) -> Result<(), ApiError> {
    let mut user: User = ctx
        .store
        .get(actor.id.as_str())?
        .ok_or_else(|| AuthError::UserNotFound(actor.id.to_string()))?;

    if !verify_password(current, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }
    validate_strength(new_password)?;

    user.set_password_hash(hash_password(new_password)?);
    user.clear_refresh_session();
    ctx.store.save(&user)?;

    tracing::info!(user = %user.id, "password changed");
    Ok(())
}

/// Block or unblock an account. Admin only.
///
/// Blocking also kills the active session, so outstanding tokens stop
/// working at the next request.
pub fn set_blocked(
    ctx: &AppContext,
    actor: &User,
    id: &str,
    blocked: bool,
) -> Result<User, ApiError> {
    require_admin(actor)?;
    if actor.id.as_str() == id {
        return Err(ApiError::Validation("Cannot block yourself".to_string()));
    }

    let changed = ctx.store.update::<User, _>(id, |user| {
        user.is_block = blocked;
        if blocked {
            user.clear_refresh_session();
        }
    })?;
    if !changed {
        return Err(AuthError::UserNotFound(id.to_string()).into());
    }

    tracing::info!(user = %id, blocked, "user block state changed");
    ctx.store
        .get(id)?
        .ok_or_else(|| AuthError::UserNotFound(id.to_string()).into())
}

/// List blocked accounts. Admin only.
pub fn list_blocked(ctx: &AppContext, actor: &User) -> Result<Vec<User>, ApiError> {
    require_admin(actor)?;
    Ok(ctx.store.find(
        &filter! {"is_block" => true},
        &FindOptions::new().sort_desc("created_at"),
    )?)
}

/// Promote or demote an account. Admin only.
pub fn change_role(
    ctx: &AppContext,
    actor: &User,
    id: &str,
    role: Role,
) -> Result<User, ApiError> {
    require_admin(actor)?;
    if actor.id.as_str() == id {
        return Err(ApiError::Validation(
            "Cannot change your own role".to_string(),
        ));
    }

    let changed = ctx.store.update::<User, _>(id, |user| user.role = role)?;
    if !changed {
        return Err(AuthError::UserNotFound(id.to_string()).into());
    }

    tracing::info!(user = %id, role = role.as_str(), "role changed");
    ctx.store
        .get(id)?
        .ok_or_else(|| AuthError::UserNotFound(id.to_string()).into())
}

/// Delete an account. Admin only.
pub fn delete_user(ctx: &AppContext, actor: &User, id: &str) -> Result<(), ApiError> {
    require_admin(actor)?;
    if !ctx.store.delete::<User>(id)? {
        return Err(AuthError::UserNotFound(id.to_string()).into());
    }
    tracing::info!(user = %id, "user deleted");
    Ok(())
}

/// Toggle a product on the caller's wishlist. Returns whether the
/// product is wishlisted afterwards.
pub fn toggle_wishlist(
    ctx: &AppContext,
    actor: &User,
    product: &ProductId,
) -> Result<bool, ApiError> {
    if ctx.store.get::<Product>(product.as_str())?.is_none() {
        return Err(CommerceError::ProductNotFound(product.to_string()).into());
    }

    let mut user: User = ctx
        .store
        .get(actor.id.as_str())?
        .ok_or_else(|| AuthError::UserNotFound(actor.id.to_string()))?;
    let added = user.toggle_wishlist(product);
    ctx.store.save(&user)?;
    Ok(added)
}

/// Resolve the caller's wishlist to products.
///
/// Products deleted since they were wishlisted are skipped.
pub fn wishlist(ctx: &AppContext, actor: &User) -> Result<Vec<Product>, ApiError> {
    let user: User = ctx
        .store
        .get(actor.id.as_str())?
        .ok_or_else(|| AuthError::UserNotFound(actor.id.to_string()))?;

    let mut products = Vec::with_capacity(user.wishlist.len());
    for id in &user.wishlist {
        if let Some(product) = ctx.store.get::<Product>(id.as_str())? {
            products.push(product);
        }
    }
    Ok(products)
}
