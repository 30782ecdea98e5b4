/// User account endpoints
///
/// # Endpoints
///
/// - `GET /v1/users/me` - Current account (authenticated)
/// - `GET /v1/users` - List users (admin)
/// - `GET /v1/users/:id` - Fetch a user (self or admin)
/// - `PUT /v1/users/:id` - Update a user (self or admin; role admin only)
/// - `DELETE /v1/users/:id` - Delete a user (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::{validation_error, Pagination},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use briefshelf_shared::{
    auth::{
        authorization::{require_admin, require_self_or_admin},
        middleware::AuthContext,
        password,
    },
    models::user::{UpdateUser, User, UserRole},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Update user request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New password (validated for strength)
    pub password: Option<String>,

    /// New display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    /// New role; admin callers only
    pub role: Option<UserRole>,
}

/// User list response
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
    pub total: i64,
}

/// Returns the authenticated user's account
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Lists users, newest first (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<UserListResponse>> {
    require_admin(&auth)?;

    let users = User::list(&state.db, pagination.limit(), pagination.offset()).await?;
    let total = User::count(&state.db).await?;

    Ok(Json(UserListResponse { users, total }))
}

/// Fetches a user by ID (self or admin)
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    require_self_or_admin(&auth, id)?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Updates a user (self or admin)
///
/// Role changes require the admin role regardless of whose account is
/// being updated, so a user cannot promote themselves.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    require_self_or_admin(&auth, id)?;

    req.validate().map_err(validation_error)?;

    if req.role.is_some() {
        require_admin(&auth)?;
    }

    let password_hash = match &req.password {
        Some(plaintext) => {
            password::validate_password_strength(plaintext).map_err(|e| {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "password".to_string(),
                    message: e,
                }])
            })?;
            Some(password::hash_password(plaintext)?)
        }
        None => None,
    };

    let user = User::update(
        &state.db,
        id,
        UpdateUser {
            email: req.email,
            password_hash,
            name: req.name.map(Some),
            role: req.role,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Deletes a user (admin only)
///
/// Bookmarks and purchases go with the account via foreign key cascade.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    require_admin(&auth)?;

    let deleted = User::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
