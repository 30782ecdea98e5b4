/// Bookmark model and database operations
///
/// A bookmark is a user's saved pointer to a content item. The key
/// (user, item type, item) is unique, so saving the same item twice is a
/// conflict.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE bookmarks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     item_type item_type NOT NULL,
///     item_id UUID NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (user_id, item_type, item_id)
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::purchase::ItemType;

/// A saved content item
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bookmark {
    /// Unique ID (UUID v4)
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Content category of the saved item
    pub item_type: ItemType,

    /// ID of the saved item
    pub item_id: Uuid,

    /// When the bookmark was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a bookmark
#[derive(Debug, Clone)]
pub struct CreateBookmark {
    pub user_id: Uuid,
    pub item_type: ItemType,
    pub item_id: Uuid,
}

impl Bookmark {
    /// Creates a bookmark
    ///
    /// A duplicate (user, item type, item) key surfaces as a unique
    /// violation from the database.
    pub async fn create(pool: &PgPool, data: CreateBookmark) -> Result<Self, sqlx::Error> {
        let bookmark = sqlx::query_as::<_, Bookmark>(
            r#"
            INSERT INTO bookmarks (user_id, item_type, item_id)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, item_type, item_id, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.item_type)
        .bind(data.item_id)
        .fetch_one(pool)
        .await?;

        Ok(bookmark)
    }

    /// Finds a bookmark by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let bookmark = sqlx::query_as::<_, Bookmark>(
            r#"
            SELECT id, user_id, item_type, item_id, created_at
            FROM bookmarks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(bookmark)
    }

    /// Lists a user's bookmarks, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let bookmarks = sqlx::query_as::<_, Bookmark>(
            r#"
            SELECT id, user_id, item_type, item_id, created_at
            FROM bookmarks
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(bookmarks)
    }

    /// Deletes a bookmark. Returns false if it didn't exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
