/// Authentication middleware for Axum
///
/// Validates Bearer tokens from the Authorization header and attaches
/// an [`AuthContext`] to request extensions so handlers can authorize
/// without re-parsing the token.
///
/// Two entry points: [`jwt_auth_middleware`] rejects unauthenticated
/// requests, and [`optional_jwt_auth_middleware`] passes them through
/// without a context. The optional variant backs public listing routes
/// that show drafts to admins but only published content to everyone
/// else.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};
use crate::models::user::UserRole;

/// Authentication context added to request extensions
///
/// Handlers extract it with Axum's `Extension` extractor; routes behind
/// the optional middleware use `Option<Extension<AuthContext>>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Role claimed by the token
    pub role: UserRole,
}

impl AuthContext {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
        }
    }
}

fn bearer_token(req: &Request) -> Result<&str, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

fn validate(token: &str, secret: &str) -> Result<AuthContext, AuthError> {
    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    Ok(AuthContext::new(claims.sub, claims.role))
}

/// JWT authentication middleware
///
/// Validates the `Authorization: Bearer <token>` header and inserts an
/// [`AuthContext`] before calling the next handler.
///
/// # Errors
///
/// Returns 401 for a missing, invalid, expired, or refresh-type token
/// and 400 for a malformed Authorization header.
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(&req)?;
    let auth_context = validate(token, &secret)?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Optional JWT authentication middleware
///
/// Like [`jwt_auth_middleware`], but a missing Authorization header is
/// not an error; the request proceeds without an [`AuthContext`]. A
/// header that is present but invalid is still rejected so a caller
/// never silently loses their identity.
pub async fn optional_jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if req.headers().get(header::AUTHORIZATION).is_some() {
        let token = bearer_token(&req)?;
        let auth_context = validate(token, &secret)?;
        req.extensions_mut().insert(auth_context);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims, TokenType};

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_auth_context_roles() {
        let admin = AuthContext::new(Uuid::new_v4(), UserRole::Admin);
        assert!(admin.is_admin());

        let user = AuthContext::new(Uuid::new_v4(), UserRole::User);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_validate_accepts_access_token() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, UserRole::User, TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        let context = validate(&token, SECRET).unwrap();
        assert_eq!(context.user_id, user_id);
        assert_eq!(context.role, UserRole::User);
    }

    #[test]
    fn test_validate_rejects_refresh_token() {
        let claims = Claims::new(Uuid::new_v4(), UserRole::User, TokenType::Refresh);
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate(&token, SECRET);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_validate_rejects_wrong_secret() {
        let claims = Claims::new(Uuid::new_v4(), UserRole::User, TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        assert!(validate(&token, "a-completely-different-secret-value").is_err());
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidFormat("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AuthError::InvalidToken("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
