/// Bookmark endpoints
///
/// # Endpoints
///
/// - `POST /v1/bookmarks` - Save an item (authenticated)
/// - `GET /v1/bookmarks/user/:user_id` - List a user's bookmarks (self or admin)
/// - `DELETE /v1/bookmarks/:id` - Remove a bookmark (owner or admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::find_item_price,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use briefshelf_shared::{
    auth::{authorization::require_self_or_admin, middleware::AuthContext},
    models::{
        bookmark::{Bookmark, CreateBookmark},
        purchase::ItemType,
    },
};
use serde::Deserialize;
use uuid::Uuid;

/// Create bookmark request
#[derive(Debug, Deserialize)]
pub struct CreateBookmarkRequest {
    pub item_type: ItemType,
    pub item_id: Uuid,
}

/// Saves a content item for the authenticated user
///
/// # Errors
///
/// - `400 Bad Request`: The body doesn't deserialize (unknown item type)
/// - `404 Not Found`: The referenced item doesn't exist
/// - `409 Conflict`: The item is already bookmarked
pub async fn create_bookmark(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateBookmarkRequest>, JsonRejection>,
) -> ApiResult<Json<Bookmark>> {
    let Json(req) = payload?;

    find_item_price(&state, req.item_type, req.item_id).await?;

    let bookmark = Bookmark::create(
        &state.db,
        CreateBookmark {
            user_id: auth.user_id,
            item_type: req.item_type,
            item_id: req.item_id,
        },
    )
    .await?;

    Ok(Json(bookmark))
}

/// Lists a user's bookmarks, newest first (self or admin)
pub async fn list_bookmarks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Bookmark>>> {
    require_self_or_admin(&auth, user_id)?;

    let bookmarks = Bookmark::list_by_user(&state.db, user_id).await?;

    Ok(Json(bookmarks))
}

/// Removes a bookmark (owner or admin)
pub async fn delete_bookmark(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let bookmark = Bookmark::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Bookmark not found".to_string()))?;

    require_self_or_admin(&auth, bookmark.user_id)?;

    Bookmark::delete(&state.db, id).await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
