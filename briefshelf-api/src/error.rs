/// Error handling for the API server
///
/// Unified error type mapping to HTTP responses. Handlers return
/// `Result<T, ApiError>`, which converts into a JSON body of the shape
/// `{ "error": "...", "message": "...", "details": [...] }`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use briefshelf_shared::models::purchase::PurchaseError;
use briefshelf_shared::storage::StorageError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), e.g. duplicate email or concurrent purchase
    Conflict(String),

    /// Unprocessable entity (422), validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),

    /// Service unavailable (503), e.g. storage not configured
    ServiceUnavailable(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g. "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already exists".to_string());
                    }
                    if constraint == "uq_purchases_completed" {
                        return ApiError::Conflict("Item already purchased".to_string());
                    }
                    if constraint.contains("slug") {
                        return ApiError::Conflict("Slug already exists".to_string());
                    }
                    if constraint.contains("bookmarks") {
                        return ApiError::Conflict("Item already bookmarked".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert JSON extractor rejections to API errors
///
/// A body that fails deserialization, e.g. an item type outside the
/// known set, is a plain 400.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Convert purchase errors to API errors
///
/// A visible duplicate is a 400 so clients can distinguish it from the
/// 409 raised by the unique index when two requests race.
impl From<PurchaseError> for ApiError {
    fn from(err: PurchaseError) -> Self {
        match err {
            PurchaseError::AlreadyPurchased => {
                ApiError::BadRequest("Item already purchased".to_string())
            }
            PurchaseError::NotFound => ApiError::NotFound("Purchase not found".to_string()),
            PurchaseError::InvalidTransition { .. } => ApiError::BadRequest(err.to_string()),
            PurchaseError::Database(e) => e.into(),
        }
    }
}

/// Convert storage errors to API errors
impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Request(e) => {
                ApiError::ServiceUnavailable(format!("Storage unreachable: {}", e))
            }
            StorageError::Service { status, .. } => {
                ApiError::InternalError(format!("Storage service returned {}", status))
            }
        }
    }
}

/// Convert auth errors to API errors
impl From<briefshelf_shared::auth::middleware::AuthError> for ApiError {
    fn from(err: briefshelf_shared::auth::middleware::AuthError) -> Self {
        use briefshelf_shared::auth::middleware::AuthError;
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing credentials".to_string())
            }
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
        }
    }
}

/// Convert authorization errors to API errors
impl From<briefshelf_shared::auth::authorization::AuthzError> for ApiError {
    fn from(err: briefshelf_shared::auth::authorization::AuthzError) -> Self {
        use briefshelf_shared::auth::authorization::AuthzError;
        match err {
            AuthzError::AdminRequired => ApiError::Forbidden("Admin access required".to_string()),
            AuthzError::NotAuthorized => {
                ApiError::Forbidden("Not authorized to access this resource".to_string())
            }
        }
    }
}

/// Convert password errors to API errors
impl From<briefshelf_shared::auth::password::PasswordError> for ApiError {
    fn from(err: briefshelf_shared::auth::password::PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JWT errors to API errors
impl From<briefshelf_shared::auth::jwt::JwtError> for ApiError {
    fn from(err: briefshelf_shared::auth::jwt::JwtError) -> Self {
        use briefshelf_shared::auth::jwt::JwtError;
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer => ApiError::Unauthorized("Invalid token issuer".to_string()),
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}
