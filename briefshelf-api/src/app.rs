/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use briefshelf_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = briefshelf_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use briefshelf_shared::auth::middleware;
use briefshelf_shared::storage::StorageClient;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use crate::error::ApiError;
use crate::routes;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; Arc
/// keeps the clone cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Storage client; None when uploads are disabled
    pub storage: Option<Arc<StorageClient>>,
}

impl AppState {
    /// Creates new application state
    ///
    /// The storage client is built only when the config carries storage
    /// settings.
    pub fn new(db: PgPool, config: Config) -> Self {
        let storage = config
            .storage
            .clone()
            .map(|cfg| Arc::new(StorageClient::new(cfg)));

        Self {
            db,
            config: Arc::new(config),
            storage,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// └── /v1/
///     ├── /auth/                    # register, login, refresh (public)
///     ├── /users/                   # account management (authenticated)
///     ├── /book-summaries/          # reads public, writes admin
///     ├── /business-plans/          # reads public, writes admin
///     ├── /blog-posts/              # reads public, writes admin
///     ├── /bookmarks/               # authenticated
///     ├── /purchases/               # authenticated; status + listing admin
///     └── /uploads                  # admin multipart upload
/// ```
///
/// Public content reads go through the optional auth layer so an admin
/// token can reveal drafts while anonymous callers see published items
/// only.
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let user_routes = Router::new()
        .route("/me", get(routes::users::me))
        .route("/", get(routes::users::list_users))
        .route("/:id", get(routes::users::get_user))
        .route("/:id", put(routes::users::update_user))
        .route("/:id", delete(routes::users::delete_user))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Reads carry the optional layer so an admin token reveals drafts;
    // writes require a valid token outright. Layering per method router
    // lets both live on the same path.
    let optional_auth = axum::middleware::from_fn_with_state(state.clone(), optional_jwt_auth_layer);
    let required_auth = axum::middleware::from_fn_with_state(state.clone(), jwt_auth_layer);

    let book_summary_routes = Router::new()
        .route(
            "/",
            get(routes::book_summaries::list_book_summaries).layer(optional_auth.clone()),
        )
        .route(
            "/",
            post(routes::book_summaries::create_book_summary).layer(required_auth.clone()),
        )
        .route(
            "/:id",
            get(routes::book_summaries::get_book_summary).layer(optional_auth.clone()),
        )
        .route(
            "/:id",
            put(routes::book_summaries::update_book_summary)
                .delete(routes::book_summaries::delete_book_summary)
                .layer(required_auth.clone()),
        );

    let business_plan_routes = Router::new()
        .route(
            "/",
            get(routes::business_plans::list_business_plans).layer(optional_auth.clone()),
        )
        .route(
            "/",
            post(routes::business_plans::create_business_plan).layer(required_auth.clone()),
        )
        .route(
            "/:id",
            get(routes::business_plans::get_business_plan).layer(optional_auth.clone()),
        )
        .route(
            "/:id",
            put(routes::business_plans::update_business_plan)
                .delete(routes::business_plans::delete_business_plan)
                .layer(required_auth.clone()),
        );

    let blog_post_routes = Router::new()
        .route(
            "/",
            get(routes::blog_posts::list_blog_posts).layer(optional_auth.clone()),
        )
        .route(
            "/",
            post(routes::blog_posts::create_blog_post).layer(required_auth.clone()),
        )
        .route(
            "/:id",
            get(routes::blog_posts::get_blog_post).layer(optional_auth.clone()),
        )
        .route(
            "/:id",
            put(routes::blog_posts::update_blog_post)
                .delete(routes::blog_posts::delete_blog_post)
                .layer(required_auth.clone()),
        )
        .route(
            "/slug/:slug",
            get(routes::blog_posts::get_blog_post_by_slug).layer(optional_auth.clone()),
        );

    let bookmark_routes = Router::new()
        .route("/", post(routes::bookmarks::create_bookmark))
        .route("/user/:user_id", get(routes::bookmarks::list_bookmarks))
        .route("/:id", delete(routes::bookmarks::delete_bookmark))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let purchase_routes = Router::new()
        .route("/", post(routes::purchases::record_purchase))
        .route("/", get(routes::purchases::list_purchases))
        .route("/user/:user_id", get(routes::purchases::list_user_purchases))
        .route(
            "/check/:user_id/:item_type/:item_id",
            get(routes::purchases::check_entitlement),
        )
        .route("/:id/status", put(routes::purchases::update_purchase_status))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let upload_routes = Router::new()
        .route("/", post(routes::uploads::upload_file))
        // Default axum body limit is 2 MB, too small for audio uploads
        .layer(axum::extract::DefaultBodyLimit::max(26 * 1024 * 1024))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/book-summaries", book_summary_routes)
        .nest("/business-plans", business_plan_routes)
        .nest("/blog-posts", blog_post_routes)
        .nest("/bookmarks", bookmark_routes)
        .nest("/purchases", purchase_routes)
        .nest("/uploads", upload_routes);

    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Rejects the request unless a valid access token is present; inserts
/// an `AuthContext` extension on success.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    middleware::jwt_auth_middleware(state.jwt_secret().to_string(), req, next)
        .await
        .map_err(Into::into)
}

/// Optional JWT authentication middleware layer
///
/// Attaches an `AuthContext` only when an Authorization header is
/// present and valid; anonymous requests pass through.
async fn optional_jwt_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    middleware::optional_jwt_auth_middleware(state.jwt_secret().to_string(), req, next)
        .await
        .map_err(Into::into)
}
