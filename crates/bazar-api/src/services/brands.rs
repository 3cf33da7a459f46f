//! Brand management.

use crate::context::AppContext;
use crate::services::require_admin;
use crate::ApiError;
use bazar_auth::User;
use bazar_commerce::catalog::slugify;
use bazar_commerce::{Brand, CommerceError};
use bazar_store::{filter, Filter, FindOptions};

/// Create a brand. Admin only. Slugs are unique.
pub fn create_brand(ctx: &AppContext, actor: &User, title: &str) -> Result<Brand, ApiError> {
    require_admin(actor)?;
    if title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }

    let brand = Brand::new(title);
    ensure_slug_free(ctx, &brand.slug, None)?;
    ctx.store.insert(&brand)?;

    tracing::info!(brand = %brand.id, slug = %brand.slug, "brand created");
    Ok(brand)
}

/// Rename a brand. Admin only. The slug follows the title.
pub fn rename_brand(
    ctx: &AppContext,
    actor: &User,
    id: &str,
    title: &str,
) -> Result<Brand, ApiError> {
    require_admin(actor)?;
    let mut brand: Brand = ctx
        .store
        .get(id)?
        .ok_or_else(|| CommerceError::BrandNotFound(id.to_string()))?;

    let new_slug = slugify(title);
    if new_slug != brand.slug {
        ensure_slug_free(ctx, &new_slug, Some(id))?;
    }
    brand.rename(title);
    ctx.store.save(&brand)?;
    Ok(brand)
}

/// Flip a brand's storefront visibility. Admin only.
pub fn toggle_brand_published(
    ctx: &AppContext,
    actor: &User,
    id: &str,
) -> Result<Brand, ApiError> {
    require_admin(actor)?;
    let mut brand: Brand = ctx
        .store
        .get(id)?
        .ok_or_else(|| CommerceError::BrandNotFound(id.to_string()))?;
    brand.toggle_published();
    ctx.store.save(&brand)?;
    Ok(brand)
}

/// Delete a brand. Admin only.
pub fn delete_brand(ctx: &AppContext, actor: &User, id: &str) -> Result<(), ApiError> {
    require_admin(actor)?;
    if !ctx.store.delete::<Brand>(id)? {
        return Err(CommerceError::BrandNotFound(id.to_string()).into());
    }
    tracing::info!(brand = %id, "brand deleted");
    Ok(())
}

/// Fetch one brand.
pub fn get_brand(ctx: &AppContext, id: &str) -> Result<Brand, ApiError> {
    ctx.store
        .get(id)?
        .ok_or_else(|| CommerceError::BrandNotFound(id.to_string()).into())
}

/// List brands, optionally only those visible on the storefront.
pub fn list_brands(ctx: &AppContext, published_only: bool) -> Result<Vec<Brand>, ApiError> {
    let filter = if published_only {
        filter! {"is_published" => true}
    } else {
        Filter::new()
    };
    Ok(ctx
        .store
        .find(&filter, &FindOptions::new().sort_asc("slug"))?)
}

fn ensure_slug_free(ctx: &AppContext, slug: &str, exclude: Option<&str>) -> Result<(), ApiError> {
    let existing: Option<Brand> = ctx.store.find_one(&filter! {"slug" => slug})?;
    if let Some(existing) = existing {
        if exclude != Some(existing.id.as_str()) {
            return Err(ApiError::Conflict(format!(
                "Brand slug already in use: {}",
                slug
            )));
        }
    }
    Ok(())
}
