//! # Briefshelf API Server
//!
//! REST backend for the Briefshelf content platform:
//! - Book summaries, business plans, and blog posts with draft/published
//!   visibility
//! - JWT authentication with user and admin roles
//! - Bookmarks and purchase/entitlement bookkeeping
//! - Admin file uploads to Supabase Storage
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p briefshelf-api
//! ```

use briefshelf_api::{
    app::{build_router, AppState},
    config::Config,
};
use briefshelf_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "briefshelf_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Briefshelf API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    migrations::ensure_database_exists(&config.database.url).await?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;
    tracing::info!("Database migrations up to date");

    if config.storage.is_none() {
        tracing::warn!("Storage not configured, file uploads are disabled");
    }

    let bind_address = config.bind_address();
    let state = AppState::new(db.clone(), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, closing database pool...");
    pool::close_pool(db).await;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}
