/// Briefshelf API server library
///
/// HTTP surface for the Briefshelf content platform: auth, content
/// catalogs (book summaries, business plans, blog posts), bookmarks,
/// purchases, and admin file uploads.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
