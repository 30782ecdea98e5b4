/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::validation_error,
};
use axum::{extract::State, Json};
use briefshelf_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User, UserRole},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (also validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

/// Tokens issued at registration and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// User ID
    pub user_id: String,

    /// Role embedded in the tokens
    pub role: UserRole,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Register a new user
///
/// New accounts always get the `user` role; admins are promoted through
/// the user management endpoints.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "email": "reader@example.com",
///   "password": "readinglist42",
///   "name": "Avid Reader"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Email already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate().map_err(validation_error)?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            name: req.name,
            role: UserRole::User,
        },
    )
    .await?;

    issue_tokens(&state, &user)
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "reader@example.com",
///   "password": "readinglist42"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate().map_err(validation_error)?;

    // Same error for unknown email and wrong password
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    issue_tokens(&state, &user)
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a new access token.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/refresh
/// Content-Type: application/json
///
/// {
///   "refresh_token": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

fn issue_tokens(state: &AppState, user: &User) -> ApiResult<Json<AuthResponse>> {
    let access_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(AuthResponse {
        user_id: user.id.to_string(),
        role: user.role,
        access_token,
        refresh_token,
    }))
}
