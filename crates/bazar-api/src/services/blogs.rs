//! Blog post management and engagement.

use crate::context::AppContext;
use crate::services::{current_timestamp, require_admin};
use crate::ApiError;
use bazar_auth::User;
use bazar_commerce::catalog::{slugify, Category, CategoryKind};
use bazar_commerce::{Blog, CommerceError};
use bazar_store::{filter, Filter, FindOptions};
use serde::Deserialize;

/// Input for [`create_blog`].
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlogInput {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub cover_image: Option<String>,
}

/// Partial update for [`update_blog`]. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBlogInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub cover_image: Option<String>,
}

/// Publish a post. Admin only. The author is the acting admin.
pub fn create_blog(ctx: &AppContext, actor: &User, input: CreateBlogInput) -> Result<Blog, ApiError> {
    require_admin(actor)?;
    if input.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    if input.description.trim().is_empty() {
        return Err(ApiError::Validation("Description is required".to_string()));
    }

    let mut blog = Blog::new(input.title, input.description).with_author(actor.full_name());
    if let Some(category_id) = input.category {
        blog = blog.with_category(resolve_blog_category(ctx, &category_id)?);
    }
    blog.cover_image = input.cover_image;

    ensure_slug_free(ctx, &blog.slug, None)?;
    ctx.store.insert(&blog)?;

    tracing::info!(blog = %blog.id, slug = %blog.slug, "blog post created");
    Ok(blog)
}

/// Edit a post. Admin only. A new title moves the slug.
pub fn update_blog(
    ctx: &AppContext,
    actor: &User,
    id: &str,
    input: UpdateBlogInput,
) -> Result<Blog, ApiError> {
    require_admin(actor)?;
    let mut blog = load(ctx, id)?;

    if let Some(title) = input.title {
        let new_slug = slugify(&title);
        if new_slug != blog.slug {
            ensure_slug_free(ctx, &new_slug, Some(id))?;
        }
        blog.slug = new_slug;
        blog.title = title;
    }
    if let Some(description) = input.description {
        blog.description = description;
    }
    if let Some(category_id) = input.category {
        blog.category = Some(resolve_blog_category(ctx, &category_id)?);
    }
    if input.cover_image.is_some() {
        blog.cover_image = input.cover_image;
    }
    blog.updated_at = current_timestamp();

    ctx.store.save(&blog)?;
    Ok(blog)
}

/// Delete a post. Admin only.
pub fn delete_blog(ctx: &AppContext, actor: &User, id: &str) -> Result<(), ApiError> {
    require_admin(actor)?;
    if !ctx.store.delete::<Blog>(id)? {
        return Err(ApiError::NotFound(format!("Blog post not found: {}", id)));
    }
    tracing::info!(blog = %id, "blog post deleted");
    Ok(())
}

/// Fetch one post, counting the view.
pub fn get_blog(ctx: &AppContext, id: &str) -> Result<Blog, ApiError> {
    let viewed = ctx.store.update::<Blog, _>(id, |blog| blog.record_view())?;
    if !viewed {
        return Err(ApiError::NotFound(format!("Blog post not found: {}", id)));
    }
    load(ctx, id)
}

/// List posts, newest first, optionally within one category.
pub fn list_blogs(ctx: &AppContext, category: Option<&str>) -> Result<Vec<Blog>, ApiError> {
    let filter = match category {
        Some(category) => filter! {"category" => category},
        None => Filter::new(),
    };
    Ok(ctx
        .store
        .find(&filter, &FindOptions::new().sort_desc("created_at"))?)
}

/// Toggle the caller's like on a post.
pub fn toggle_blog_like(ctx: &AppContext, actor: &User, id: &str) -> Result<Blog, ApiError> {
    let mut blog = load(ctx, id)?;
    blog.toggle_like(&actor.id);
    ctx.store.save(&blog)?;
    Ok(blog)
}

/// Toggle the caller's dislike on a post.
pub fn toggle_blog_dislike(ctx: &AppContext, actor: &User, id: &str) -> Result<Blog, ApiError> {
    let mut blog = load(ctx, id)?;
    blog.toggle_dislike(&actor.id);
    ctx.store.save(&blog)?;
    Ok(blog)
}

fn load(ctx: &AppContext, id: &str) -> Result<Blog, ApiError> {
    ctx.store
        .get(id)?
        .ok_or_else(|| ApiError::NotFound(format!("Blog post not found: {}", id)))
}

fn resolve_blog_category(
    ctx: &AppContext,
    id: &str,
) -> Result<bazar_commerce::CategoryId, ApiError> {
    let category: Category = ctx
        .store
        .get(id)?
        .ok_or_else(|| CommerceError::CategoryNotFound(id.to_string()))?;
    if category.kind != CategoryKind::Blog {
        return Err(ApiError::Validation(format!(
            "Not a blog category: {}",
            category.slug
        )));
    }
    Ok(category.id)
}

fn ensure_slug_free(ctx: &AppContext, slug: &str, exclude: Option<&str>) -> Result<(), ApiError> {
    let existing: Option<Blog> = ctx.store.find_one(&filter! {"slug" => slug})?;
    if let Some(existing) = existing {
        if exclude != Some(existing.id.as_str()) {
            return Err(ApiError::Conflict(format!(
                "Blog slug already in use: {}",
                slug
            )));
        }
    }
    Ok(())
}
