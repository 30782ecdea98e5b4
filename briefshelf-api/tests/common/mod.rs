/// Common test utilities for integration tests
///
/// Provides a TestContext that connects to the database named by
/// DATABASE_URL, runs migrations, seeds an admin and a regular user,
/// and builds the router for in-process requests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use briefshelf_api::app::{build_router, AppState};
use briefshelf_api::config::Config;
use briefshelf_shared::auth::jwt::{create_token, Claims, TokenType};
use briefshelf_shared::models::user::{CreateUser, User, UserRole};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub admin: User,
    pub admin_token: String,
    pub user: User,
    pub user_token: String,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to this crate's Cargo.toml
        sqlx::migrate!("../briefshelf-shared/migrations")
            .run(&db)
            .await?;

        let admin = User::create(
            &db,
            CreateUser {
                email: format!("admin-{}@example.com", Uuid::new_v4()),
                password_hash: "unused".to_string(),
                name: Some("Test Admin".to_string()),
                role: UserRole::Admin,
            },
        )
        .await?;

        let user = User::create(
            &db,
            CreateUser {
                email: format!("user-{}@example.com", Uuid::new_v4()),
                password_hash: "unused".to_string(),
                name: Some("Test User".to_string()),
                role: UserRole::User,
            },
        )
        .await?;

        let admin_claims = Claims::new(admin.id, UserRole::Admin, TokenType::Access);
        let admin_token = create_token(&admin_claims, &config.jwt.secret)?;

        let user_claims = Claims::new(user.id, UserRole::User, TokenType::Access);
        let user_token = create_token(&user_claims, &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            admin,
            admin_token,
            user,
            user_token,
        })
    }

    pub fn admin_auth(&self) -> String {
        format!("Bearer {}", self.admin_token)
    }

    pub fn user_auth(&self) -> String {
        format!("Bearer {}", self.user_token)
    }

    /// Sends a request through the router and returns the status plus
    /// the parsed JSON body
    pub async fn send(
        &self,
        request: Request<Body>,
    ) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let response = self.app.clone().call(request).await?;
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body)?
        };
        Ok((status, json))
    }

    /// Removes the seeded users; their bookmarks and purchases cascade
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        User::delete(&self.db, self.admin.id).await?;
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}

/// Builds a JSON request with optional bearer auth
pub fn json_request(
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
