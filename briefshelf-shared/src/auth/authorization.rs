/// Authorization helpers
///
/// Two roles exist: `user` and `admin`. Admins manage content, users,
/// and purchases; users manage only their own bookmarks and see their
/// own purchase history.
///
/// # Example
///
/// ```
/// use briefshelf_shared::auth::authorization::{require_admin, require_self_or_admin};
/// use briefshelf_shared::auth::middleware::AuthContext;
/// use briefshelf_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// let admin = AuthContext::new(Uuid::new_v4(), UserRole::Admin);
/// assert!(require_admin(&admin).is_ok());
///
/// let user = AuthContext::new(Uuid::new_v4(), UserRole::User);
/// assert!(require_admin(&user).is_err());
/// assert!(require_self_or_admin(&user, user.user_id).is_ok());
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller lacks the admin role
    #[error("Admin access required")]
    AdminRequired,

    /// Caller is neither the resource owner nor an admin
    #[error("Not authorized to access this resource")]
    NotAuthorized,
}

/// Requires the caller to be an admin
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::AdminRequired)
    }
}

/// Requires the caller to be the named user or an admin
///
/// Used for per-user resources like bookmark lists and purchase history.
pub fn require_self_or_admin(auth: &AuthContext, user_id: Uuid) -> Result<(), AuthzError> {
    if auth.user_id == user_id || auth.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::NotAuthorized)
    }
}
