//! Product catalog management and browsing.

use crate::context::AppContext;
use crate::services::{require_admin, Pagination};
use crate::ApiError;
use bazar_auth::User;
use bazar_commerce::{
    Brand, Category, CategoryKind, CommerceError, Money, Product,
};
use bazar_store::{filter, Filter, FindOptions};
use serde::Deserialize;

/// Input for [`create_product`].
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    pub title: String,
    pub description: Option<String>,
    /// Price in the smallest currency unit.
    pub price_minor: i64,
    pub quantity: i64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
}

/// Input for [`update_product`]. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_minor: Option<i64>,
    pub quantity: Option<i64>,
    pub images: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub brand: Option<String>,
    pub category: Option<String>,
}

/// Sort orders for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    BestSelling,
}

/// Listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    #[serde(default)]
    pub in_stock_only: bool,
    #[serde(default)]
    pub sort: ProductSort,
}

/// Create a product. Admin only. Slugs are unique.
pub fn create_product(
    ctx: &AppContext,
    actor: &User,
    input: CreateProductInput,
) -> Result<Product, ApiError> {
    require_admin(actor)?;
    if input.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    if input.price_minor <= 0 {
        return Err(ApiError::Validation("Price must be positive".to_string()));
    }
    if input.quantity < 0 {
        return Err(ApiError::Validation("Quantity cannot be negative".to_string()));
    }

    let mut product = Product::new(
        input.title,
        Money::new(input.price_minor, ctx.config.currency),
    )
    .with_quantity(input.quantity);
    product.images = input.images;
    product.colors = input.colors;
    product.description = input.description;

    if let Some(brand_id) = input.brand {
        let brand: Brand = ctx
            .store
            .get(&brand_id)?
            .ok_or(CommerceError::BrandNotFound(brand_id))?;
        product.brand = Some(brand.id);
    }
    if let Some(category_id) = input.category {
        product.category = Some(resolve_product_category(ctx, &category_id)?.id);
    }

    ensure_slug_free(ctx, &product.slug)?;
    ctx.store.insert(&product)?;

    tracing::info!(product = %product.id, slug = %product.slug, "product created");
    Ok(product)
}

/// Update a product. Admin only.
pub fn update_product(
    ctx: &AppContext,
    actor: &User,
    id: &str,
    input: UpdateProductInput,
) -> Result<Product, ApiError> {
    require_admin(actor)?;
    let mut product: Product = ctx
        .store
        .get(id)?
        .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))?;

    if let Some(title) = input.title {
        let new_slug = bazar_commerce::catalog::slugify(&title);
        if new_slug != product.slug {
            ensure_slug_free(ctx, &new_slug)?;
        }
        product.title = title;
        product.slug = new_slug;
    }
    if let Some(description) = input.description {
        product.description = Some(description);
    }
    if let Some(price_minor) = input.price_minor {
        if price_minor <= 0 {
            return Err(ApiError::Validation("Price must be positive".to_string()));
        }
        product.price = Money::new(price_minor, ctx.config.currency);
    }
    if let Some(quantity) = input.quantity {
        if quantity < 0 {
            return Err(ApiError::Validation("Quantity cannot be negative".to_string()));
        }
        product.quantity = quantity;
    }
    if let Some(images) = input.images {
        product.images = images;
    }
    if let Some(colors) = input.colors {
        product.colors = colors;
    }
    if let Some(brand_id) = input.brand {
        let brand: Brand = ctx
            .store
            .get(&brand_id)?
            .ok_or(CommerceError::BrandNotFound(brand_id))?;
        product.brand = Some(brand.id);
    }
    if let Some(category_id) = input.category {
        product.category = Some(resolve_product_category(ctx, &category_id)?.id);
    }

    ctx.store.save(&product)?;
    Ok(product)
}

/// Delete a product. Admin only.
pub fn delete_product(ctx: &AppContext, actor: &User, id: &str) -> Result<(), ApiError> {
    require_admin(actor)?;
    if !ctx.store.delete::<Product>(id)? {
        return Err(CommerceError::ProductNotFound(id.to_string()).into());
    }
    tracing::info!(product = %id, "product deleted");
    Ok(())
}

/// Fetch a product by id.
pub fn get_product(ctx: &AppContext, id: &str) -> Result<Product, ApiError> {
    ctx.store
        .get(id)?
        .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()).into())
}

/// Fetch a product by slug.
pub fn get_product_by_slug(ctx: &AppContext, slug: &str) -> Result<Product, ApiError> {
    ctx.store
        .find_one(&filter! {"slug" => slug})?
        .ok_or_else(|| CommerceError::ProductNotFound(slug.to_string()).into())
}

/// Browse the catalog with filters, sort, and pagination.
pub fn list_products(
    ctx: &AppContext,
    query: &ProductQuery,
    page: Pagination,
) -> Result<Vec<Product>, ApiError> {
    let mut filter = Filter::new();
    if let Some(category) = &query.category {
        filter = filter.eq("category", category.as_str());
    }
    if let Some(brand) = &query.brand {
        filter = filter.eq("brand", brand.as_str());
    }
    if query.in_stock_only {
        filter = filter.gt("quantity", 0);
    }

    let options = match query.sort {
        ProductSort::Newest => FindOptions::new().sort_desc("created_at"),
        ProductSort::PriceAsc => FindOptions::new().sort_asc("price.amount_minor"),
        ProductSort::PriceDesc => FindOptions::new().sort_desc("price.amount_minor"),
        ProductSort::BestSelling => FindOptions::new().sort_desc("sold"),
    };

    Ok(ctx.store.find(&filter, &page.apply(options))?)
}

/// Rate a product. One rating per user; rating again replaces it.
pub fn rate_product(
    ctx: &AppContext,
    actor: &User,
    id: &str,
    stars: u8,
    comment: Option<String>,
) -> Result<Product, ApiError> {
    let mut product: Product = ctx
        .store
        .get(id)?
        .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))?;
    product.rate(actor.id.clone(), stars, comment)?;
    ctx.store.save(&product)?;
    Ok(product)
}

fn ensure_slug_free(ctx: &AppContext, slug: &str) -> Result<(), ApiError> {
    if ctx
        .store
        .find_one::<Product>(&filter! {"slug" => slug})?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "Product slug already in use: {}",
            slug
        )));
    }
    Ok(())
}

fn resolve_product_category(ctx: &AppContext, id: &str) -> Result<Category, ApiError> {
    let category: Category = ctx
        .store
        .get(id)?
        .ok_or_else(|| CommerceError::CategoryNotFound(id.to_string()))?;
    if category.kind != CategoryKind::Product {
        return Err(ApiError::Validation(
            "Category does not belong to the product catalog".to_string(),
        ));
    }
    Ok(category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil::{seed_admin, seed_user, test_ctx};

    fn input(title: &str, price: i64) -> CreateProductInput {
        CreateProductInput {
            title: title.into(),
            description: None,
            price_minor: price,
            quantity: 5,
            images: vec![],
            colors: vec![],
            brand: None,
            category: None,
        }
    }

    #[test]
    fn test_create_requires_admin() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        assert!(matches!(
            create_product(&ctx, &user, input("Phone", 1000)),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn test_create_and_fetch() {
        let (ctx, _) = test_ctx();
        let admin = seed_admin(&ctx);
        let product = create_product(&ctx, &admin, input("Galaxy S24", 1000)).unwrap();

        assert_eq!(get_product(&ctx, product.id.as_str()).unwrap().id, product.id);
        assert_eq!(
            get_product_by_slug(&ctx, "galaxy-s24").unwrap().id,
            product.id
        );
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let (ctx, _) = test_ctx();
        let admin = seed_admin(&ctx);
        create_product(&ctx, &admin, input("Galaxy S24", 1000)).unwrap();
        assert!(matches!(
            create_product(&ctx, &admin, input("Galaxy S24", 2000)),
            Err(ApiError::Conflict(_))
        ));
    }

    #[test]
    fn test_invalid_price_rejected() {
        let (ctx, _) = test_ctx();
        let admin = seed_admin(&ctx);
        assert!(matches!(
            create_product(&ctx, &admin, input("Phone", 0)),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_brand_rejected() {
        let (ctx, _) = test_ctx();
        let admin = seed_admin(&ctx);
        let mut bad = input("Phone", 1000);
        bad.brand = Some("nope".into());
        assert!(matches!(
            create_product(&ctx, &admin, bad),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_blog_category_rejected_for_product() {
        let (ctx, _) = test_ctx();
        let admin = seed_admin(&ctx);
        let blog_cat = Category::new("News", CategoryKind::Blog);
        ctx.store.insert(&blog_cat).unwrap();

        let mut bad = input("Phone", 1000);
        bad.category = Some(blog_cat.id.to_string());
        assert!(matches!(
            create_product(&ctx, &admin, bad),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_update_title_refreshes_slug() {
        let (ctx, _) = test_ctx();
        let admin = seed_admin(&ctx);
        let product = create_product(&ctx, &admin, input("Old Name", 1000)).unwrap();

        let updated = update_product(
            &ctx,
            &admin,
            product.id.as_str(),
            UpdateProductInput {
                title: Some("New Name".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.slug, "new-name");
    }

    #[test]
    fn test_list_filters_and_sort() {
        let (ctx, _) = test_ctx();
        let admin = seed_admin(&ctx);
        create_product(&ctx, &admin, input("Cheap", 100)).unwrap();
        create_product(&ctx, &admin, input("Pricey", 9000)).unwrap();
        let mut gone = input("Sold Out", 500);
        gone.quantity = 0;
        create_product(&ctx, &admin, gone).unwrap();

        let all = list_products(&ctx, &ProductQuery::default(), Pagination::first(10)).unwrap();
        assert_eq!(all.len(), 3);

        let in_stock = list_products(
            &ctx,
            &ProductQuery {
                in_stock_only: true,
                sort: ProductSort::PriceAsc,
                ..Default::default()
            },
            Pagination::first(10),
        )
        .unwrap();
        assert_eq!(in_stock.len(), 2);
        assert_eq!(in_stock[0].slug, "cheap");
        assert_eq!(in_stock[1].slug, "pricey");
    }

    #[test]
    fn test_rate_product() {
        let (ctx, _) = test_ctx();
        let admin = seed_admin(&ctx);
        let user = seed_user(&ctx, "a@example.com");
        let product = create_product(&ctx, &admin, input("Phone", 1000)).unwrap();

        let rated = rate_product(&ctx, &user, product.id.as_str(), 4, None).unwrap();
        assert_eq!(rated.average_rating(), Some(4.0));

        // Rating again replaces, not appends.
        let rated = rate_product(&ctx, &user, product.id.as_str(), 2, None).unwrap();
        assert_eq!(rated.ratings.len(), 1);
        assert_eq!(rated.average_rating(), Some(2.0));
    }
}
