/// Database models for Briefshelf
///
/// Every model exposes its CRUD operations as associated functions taking a
/// `&PgPool`, following the shape `Model::create(&pool, data)`.
///
/// # Models
///
/// - `user`: User accounts with a flat user/admin role
/// - `book_summary`: Purchasable book summary content
/// - `business_plan`: Purchasable business plan content
/// - `blog_post`: Free blog content with slug lookup
/// - `bookmark`: Per-user saved content items
/// - `purchase`: Purchase records and entitlement checks

use serde::{Deserialize, Serialize};

pub mod blog_post;
pub mod book_summary;
pub mod bookmark;
pub mod business_plan;
pub mod purchase;
pub mod user;

/// Publication status shared by all content types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "content_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    /// Visible to admins only
    Draft,

    /// Visible to everyone
    Published,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_status_as_str() {
        assert_eq!(ContentStatus::Draft.as_str(), "draft");
        assert_eq!(ContentStatus::Published.as_str(), "published");
    }

    #[test]
    fn test_content_status_serde() {
        let json = serde_json::to_string(&ContentStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");

        let status: ContentStatus = serde_json::from_str("\"draft\"").unwrap();
        assert_eq!(status, ContentStatus::Draft);
    }
}
