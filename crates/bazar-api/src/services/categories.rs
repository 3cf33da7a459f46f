//! Category hierarchy management.

use crate::context::AppContext;
use crate::services::require_admin;
use crate::ApiError;
use bazar_auth::User;
use bazar_commerce::catalog::{build_tree, slugify, Category, CategoryKind, CategoryNode};
use bazar_commerce::CommerceError;
use bazar_store::{filter, Filter, FindOptions};
use serde::Deserialize;

/// Input for [`create_category`].
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryInput {
    pub title: String,
    pub kind: CategoryKind,
    pub parent: Option<String>,
}

/// Create a category. Admin only.
///
/// Slugs are unique within a kind; a parent must exist and organize
/// the same side of the site.
pub fn create_category(
    ctx: &AppContext,
    actor: &User,
    input: CreateCategoryInput,
) -> Result<Category, ApiError> {
    require_admin(actor)?;
    if input.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }

    let mut category = Category::new(input.title, input.kind);
    if let Some(parent_id) = input.parent {
        let parent: Category = ctx
            .store
            .get(&parent_id)?
            .ok_or(CommerceError::CategoryNotFound(parent_id))?;
        category = category.with_parent(&parent)?;
    }

    ensure_slug_free(ctx, &category.slug, input.kind, None)?;
    ctx.store.insert(&category)?;

    tracing::info!(category = %category.id, kind = category.kind.as_str(), "category created");
    Ok(category)
}

/// Rename a category. Admin only. The slug follows the title.
pub fn rename_category(
    ctx: &AppContext,
    actor: &User,
    id: &str,
    title: &str,
) -> Result<Category, ApiError> {
    require_admin(actor)?;
    let mut category: Category = ctx
        .store
        .get(id)?
        .ok_or_else(|| CommerceError::CategoryNotFound(id.to_string()))?;

    let new_slug = slugify(title);
    if new_slug != category.slug {
        ensure_slug_free(ctx, &new_slug, category.kind, Some(id))?;
    }
    category.rename(title);
    ctx.store.save(&category)?;
    Ok(category)
}

/// Delete a category. Admin only.
///
/// A category with children cannot be deleted; reparent or remove the
/// children first.
pub fn delete_category(ctx: &AppContext, actor: &User, id: &str) -> Result<(), ApiError> {
    require_admin(actor)?;
    if ctx.store.get::<Category>(id)?.is_none() {
        return Err(CommerceError::CategoryNotFound(id.to_string()).into());
    }

    let children = ctx.store.count::<Category>(&filter! {"parent" => id})?;
    if children > 0 {
        return Err(ApiError::Conflict(format!(
            "Category has {} child categories",
            children
        )));
    }

    ctx.store.delete::<Category>(id)?;
    tracing::info!(category = %id, "category deleted");
    Ok(())
}

/// Fetch one category.
pub fn get_category(ctx: &AppContext, id: &str) -> Result<Category, ApiError> {
    ctx.store
        .get(id)?
        .ok_or_else(|| CommerceError::CategoryNotFound(id.to_string()).into())
}

/// Fetch a category with its full subtree of children.
pub fn get_category_tree(ctx: &AppContext, id: &str) -> Result<CategoryNode, ApiError> {
    let root: Category = ctx
        .store
        .get(id)?
        .ok_or_else(|| CommerceError::CategoryNotFound(id.to_string()))?;
    let all: Vec<Category> = ctx.store.find(
        &filter! {"kind" => root.kind.as_str()},
        &FindOptions::new().sort_asc("slug"),
    )?;
    Ok(build_tree(&root, &all)?)
}

/// Expand every root category to its full tree, optionally one kind.
pub fn list_category_trees(
    ctx: &AppContext,
    kind: Option<CategoryKind>,
) -> Result<Vec<CategoryNode>, ApiError> {
    let all = list_categories(ctx, kind)?;
    let mut trees = Vec::new();
    for root in all.iter().filter(|c| c.parent.is_none()) {
        trees.push(build_tree(root, &all)?);
    }
    Ok(trees)
}

/// List categories, optionally restricted to one kind.
pub fn list_categories(
    ctx: &AppContext,
    kind: Option<CategoryKind>,
) -> Result<Vec<Category>, ApiError> {
    let filter = match kind {
        Some(kind) => filter! {"kind" => kind.as_str()},
        None => Filter::new(),
    };
    Ok(ctx
        .store
        .find(&filter, &FindOptions::new().sort_asc("slug"))?)
}

fn ensure_slug_free(
    ctx: &AppContext,
    slug: &str,
    kind: CategoryKind,
    exclude: Option<&str>,
) -> Result<(), ApiError> {
    let existing: Option<Category> = ctx
        .store
        .find_one(&filter! {"slug" => slug, "kind" => kind.as_str()})?;
    if let Some(existing) = existing {
        if exclude != Some(existing.id.as_str()) {
            return Err(ApiError::Conflict(format!(
                "Category slug already in use: {}",
                slug
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil::{seed_admin, test_ctx};

    fn input(title: &str, kind: CategoryKind, parent: Option<String>) -> CreateCategoryInput {
        CreateCategoryInput {
            title: title.into(),
            kind,
            parent,
        }
    }

    #[test]
    fn test_create_and_tree() {
        let (ctx, _) = test_ctx();
        let admin = seed_admin(&ctx);

        let root = create_category(
            &ctx,
            &admin,
            input("Electronics", CategoryKind::Product, None),
        )
        .unwrap();
        let phones = create_category(
            &ctx,
            &admin,
            input(
                "Phones",
                CategoryKind::Product,
                Some(root.id.to_string()),
            ),
        )
        .unwrap();
        create_category(
            &ctx,
            &admin,
            input(
                "Android",
                CategoryKind::Product,
                Some(phones.id.to_string()),
            ),
        )
        .unwrap();

        let tree = get_category_tree(&ctx, root.id.as_str()).unwrap();
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].children.len(), 1);
        assert_eq!(tree.children[0].children[0].category.slug, "android");
    }

    #[test]
    fn test_same_slug_across_kinds_allowed() {
        let (ctx, _) = test_ctx();
        let admin = seed_admin(&ctx);

        create_category(&ctx, &admin, input("News", CategoryKind::Product, None)).unwrap();
        assert!(create_category(&ctx, &admin, input("News", CategoryKind::Blog, None)).is_ok());
        assert!(matches!(
            create_category(&ctx, &admin, input("News", CategoryKind::Product, None)),
            Err(ApiError::Conflict(_))
        ));
    }

    #[test]
    fn test_parent_kind_must_match() {
        let (ctx, _) = test_ctx();
        let admin = seed_admin(&ctx);
        let blog_root =
            create_category(&ctx, &admin, input("Stories", CategoryKind::Blog, None)).unwrap();

        assert!(matches!(
            create_category(
                &ctx,
                &admin,
                input(
                    "Phones",
                    CategoryKind::Product,
                    Some(blog_root.id.to_string()),
                ),
            ),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_delete_with_children_rejected() {
        let (ctx, _) = test_ctx();
        let admin = seed_admin(&ctx);
        let root = create_category(
            &ctx,
            &admin,
            input("Electronics", CategoryKind::Product, None),
        )
        .unwrap();
        let child = create_category(
            &ctx,
            &admin,
            input(
                "Phones",
                CategoryKind::Product,
                Some(root.id.to_string()),
            ),
        )
        .unwrap();

        assert!(matches!(
            delete_category(&ctx, &admin, root.id.as_str()),
            Err(ApiError::Conflict(_))
        ));

        delete_category(&ctx, &admin, child.id.as_str()).unwrap();
        assert!(delete_category(&ctx, &admin, root.id.as_str()).is_ok());
    }

    #[test]
    fn test_rename_checks_slug() {
        let (ctx, _) = test_ctx();
        let admin = seed_admin(&ctx);
        let a = create_category(&ctx, &admin, input("Phones", CategoryKind::Product, None))
            .unwrap();
        create_category(&ctx, &admin, input("Laptops", CategoryKind::Product, None)).unwrap();

        assert!(matches!(
            rename_category(&ctx, &admin, a.id.as_str(), "Laptops"),
            Err(ApiError::Conflict(_))
        ));
        // Renaming to itself is fine.
        assert!(rename_category(&ctx, &admin, a.id.as_str(), "Phones").is_ok());
    }

    #[test]
    fn test_root_trees() {
        let (ctx, _) = test_ctx();
        let admin = seed_admin(&ctx);
        let root = create_category(
            &ctx,
            &admin,
            input("Electronics", CategoryKind::Product, None),
        )
        .unwrap();
        create_category(
            &ctx,
            &admin,
            input(
                "Phones",
                CategoryKind::Product,
                Some(root.id.to_string()),
            ),
        )
        .unwrap();
        create_category(&ctx, &admin, input("Clothing", CategoryKind::Product, None)).unwrap();
        create_category(&ctx, &admin, input("Stories", CategoryKind::Blog, None)).unwrap();

        let trees = list_category_trees(&ctx, Some(CategoryKind::Product)).unwrap();
        assert_eq!(trees.len(), 2);
        let electronics = trees
            .iter()
            .find(|t| t.category.slug == "electronics")
            .unwrap();
        assert_eq!(electronics.children.len(), 1);

        assert_eq!(list_category_trees(&ctx, None).unwrap().len(), 3);
    }

    #[test]
    fn test_list_by_kind() {
        let (ctx, _) = test_ctx();
        let admin = seed_admin(&ctx);
        create_category(&ctx, &admin, input("Phones", CategoryKind::Product, None)).unwrap();
        create_category(&ctx, &admin, input("Stories", CategoryKind::Blog, None)).unwrap();

        assert_eq!(list_categories(&ctx, None).unwrap().len(), 2);
        assert_eq!(
            list_categories(&ctx, Some(CategoryKind::Blog)).unwrap().len(),
            1
        );
    }
}
