/// Authentication and authorization
///
/// - [`jwt`]: HS256 token creation and validation
/// - [`password`]: Argon2id hashing and strength checks
/// - [`middleware`]: Axum layers that attach an `AuthContext`
/// - [`authorization`]: role checks built on `AuthContext`

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
