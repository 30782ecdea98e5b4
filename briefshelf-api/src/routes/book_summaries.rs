/// Book summary endpoints
///
/// # Endpoints
///
/// - `GET /v1/book-summaries` - List (public; drafts admin only)
/// - `GET /v1/book-summaries/:id` - Fetch one (public; drafts admin only)
/// - `POST /v1/book-summaries` - Create (admin)
/// - `PUT /v1/book-summaries/:id` - Update (admin)
/// - `DELETE /v1/book-summaries/:id` - Delete (admin)

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
        book_summary::{
            BookSummary, BookSummaryFilter, CreateBookSummary, UpdateBookSummary,
        },
        ContentStatus,
    },
};
use serde::Deserialize;
use uuid::Uuid;

/// Listing query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub status: Option<ContentStatus>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Pins the status filter for non-admin callers
///
/// Anonymous and regular users see published content only; an admin may
/// pass `status=draft` or omit the filter to see everything.
fn effective_status(
    auth: &Option<Extension<AuthContext>>,
    requested: Option<ContentStatus>,
) -> Option<ContentStatus> {
    match auth {
        Some(Extension(ctx)) if ctx.is_admin() => requested,
        _ => Some(ContentStatus::Published),
    }
}

/// Lists book summaries with optional category, status, and search filters
pub async fn list_book_summaries(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<BookSummary>>> {
    let filter = BookSummaryFilter {
        category: query.category,
        status: effective_status(&auth, query.status),
        search: query.search,
    };

    let pagination = Pagination {
        limit: query.limit,
        offset: query.offset,
    };
    let summaries = BookSummary::list(
        &state.db,
        filter,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(summaries))
}

/// Fetches a single book summary
///
/// A draft is visible to admins only; everyone else gets a 404 so draft
/// IDs don't leak.
pub async fn get_book_summary(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BookSummary>> {
    let summary = BookSummary::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book summary not found".to_string()))?;

    let is_admin = matches!(&auth, Some(Extension(ctx)) if ctx.is_admin());
    if summary.status == ContentStatus::Draft && !is_admin {
        return Err(ApiError::NotFound("Book summary not found".to_string()));
    }

    Ok(Json(summary))
}

/// Creates a book summary (admin only)
pub async fn create_book_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateBookSummary>,
) -> ApiResult<Json<BookSummary>> {
    require_admin(&auth)?;

    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title must not be empty".to_string()));
    }
    if req.price < 0 {
        return Err(ApiError::BadRequest("Price must not be negative".to_string()));
    }

    let summary = BookSummary::create(&state.db, req).await?;

    tracing::info!(summary_id = %summary.id, "Book summary created");

    Ok(Json(summary))
}

/// Updates a book summary (admin only)
pub async fn update_book_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBookSummary>,
) -> ApiResult<Json<BookSummary>> {
    require_admin(&auth)?;

    if matches!(&req.title, Some(t) if t.trim().is_empty()) {
        return Err(ApiError::BadRequest("Title must not be empty".to_string()));
    }
    if matches!(req.price, Some(p) if p < 0) {
        return Err(ApiError::BadRequest("Price must not be negative".to_string()));
    }

    let summary = BookSummary::update(&state.db, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book summary not found".to_string()))?;

    Ok(Json(summary))
}

/// Deletes a book summary and its bookmarks and purchases (admin only)
pub async fn delete_book_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    require_admin(&auth)?;

    let deleted = BookSummary::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Book summary not found".to_string()));
    }

    tracing::info!(summary_id = %id, "Book summary deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
