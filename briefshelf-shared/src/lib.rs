//! # Briefshelf Shared Library
//!
//! Shared types and business logic used by the Briefshelf API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `auth`: Password hashing, JWT tokens, middleware, authorization
//! - `db`: Connection pool and migration runner
//! - `storage`: Supabase Storage upload client

pub mod auth;
pub mod db;
pub mod models;
pub mod storage;

/// Current version of the Briefshelf shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
