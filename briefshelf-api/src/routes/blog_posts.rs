/// Blog post endpoints
///
/// # Endpoints
///
/// - `GET /v1/blog-posts` - List (public; drafts admin only)
/// - `GET /v1/blog-posts/:id` - Fetch by ID (public; drafts admin only)
/// - `GET /v1/blog-posts/slug/:slug` - Fetch by slug (public; drafts admin only)
/// - `POST /v1/blog-posts` - Create (admin)
/// - `PUT /v1/blog-posts/:id` - Update (admin)
/// - `DELETE /v1/blog-posts/:id` - Delete (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::Pagination,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use briefshelf_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::{
        blog_post::{slugify, BlogPost, CreateBlogPost, UpdateBlogPost},
        ContentStatus,
    },
};
use serde::Deserialize;
use uuid::Uuid;

/// Listing query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<ContentStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Create request; the slug is derived from the title when omitted
#[derive(Debug, Deserialize)]
pub struct CreateBlogPostRequest {
    pub title: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub cover_image_url: Option<String>,
    pub author_name: Option<String>,
    pub status: Option<ContentStatus>,
}

fn is_admin(auth: &Option<Extension<AuthContext>>) -> bool {
    matches!(auth, Some(Extension(ctx)) if ctx.is_admin())
}

fn visible(post: &BlogPost, admin: bool) -> bool {
    admin || post.status == ContentStatus::Published
}

/// Lists blog posts, newest first
pub async fn list_blog_posts(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<BlogPost>>> {
    let status = if is_admin(&auth) {
        query.status
    } else {
        Some(ContentStatus::Published)
    };

    let pagination = Pagination {
        limit: query.limit,
        offset: query.offset,
    };
    let posts = BlogPost::list(
        &state.db,
        status,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(posts))
}

/// Fetches a blog post by ID; drafts are admin only
pub async fn get_blog_post(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BlogPost>> {
    let post = BlogPost::find_by_id(&state.db, id)
        .await?
        .filter(|p| visible(p, is_admin(&auth)))
        .ok_or_else(|| ApiError::NotFound("Blog post not found".to_string()))?;

    Ok(Json(post))
}

/// Fetches a blog post by slug; drafts are admin only
pub async fn get_blog_post_by_slug(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<BlogPost>> {
    let post = BlogPost::find_by_slug(&state.db, &slug)
        .await?
        .filter(|p| visible(p, is_admin(&auth)))
        .ok_or_else(|| ApiError::NotFound("Blog post not found".to_string()))?;

    Ok(Json(post))
}

/// Creates a blog post (admin only)
///
/// If no slug is given, one is derived from the title. A duplicate slug
/// is a 409.
pub async fn create_blog_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateBlogPostRequest>,
) -> ApiResult<Json<BlogPost>> {
    require_admin(&auth)?;

    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title must not be empty".to_string()));
    }

    let slug = match req.slug {
        Some(slug) if !slug.trim().is_empty() => slug,
        _ => slugify(&req.title),
    };
    if slug.is_empty() {
        return Err(ApiError::BadRequest(
            "Could not derive a slug from the title".to_string(),
        ));
    }

    let post = BlogPost::create(
        &state.db,
        CreateBlogPost {
            title: req.title,
            slug,
            excerpt: req.excerpt,
            content: req.content,
            cover_image_url: req.cover_image_url,
            author_name: req.author_name,
            status: req.status,
        },
    )
    .await?;

    tracing::info!(post_id = %post.id, slug = %post.slug, "Blog post created");

    Ok(Json(post))
}

/// Updates a blog post (admin only)
pub async fn update_blog_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBlogPost>,
) -> ApiResult<Json<BlogPost>> {
    require_admin(&auth)?;

    if matches!(&req.title, Some(t) if t.trim().is_empty()) {
        return Err(ApiError::BadRequest("Title must not be empty".to_string()));
    }
    if matches!(&req.slug, Some(s) if s.trim().is_empty()) {
        return Err(ApiError::BadRequest("Slug must not be empty".to_string()));
    }

    let post = BlogPost::update(&state.db, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Blog post not found".to_string()))?;

    Ok(Json(post))
}

/// Deletes a blog post (admin only)
pub async fn delete_blog_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    require_admin(&auth)?;

    let deleted = BlogPost::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Blog post not found".to_string()));
    }

    tracing::info!(post_id = %id, "Blog post deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
