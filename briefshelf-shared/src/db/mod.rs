/// Database layer for Briefshelf
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: Database migration runner built on sqlx migrations
///
/// Models live in the `models` module at the crate root.

pub mod migrations;
pub mod pool;
