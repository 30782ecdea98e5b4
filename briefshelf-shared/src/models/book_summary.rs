/// Book summary model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE book_summaries (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     author VARCHAR(255) NOT NULL,
///     description TEXT,
///     category VARCHAR(100),
///     cover_image_url TEXT,
///     audio_url TEXT,
///     content TEXT,
///     read_time_minutes INT,
///     price BIGINT NOT NULL DEFAULT 0 CHECK (price >= 0),
///     status content_status NOT NULL DEFAULT 'draft',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::purchase::ItemType;
use super::ContentStatus;

/// A book summary with optional audio narration
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BookSummary {
    /// Unique ID (UUID v4)
    pub id: Uuid,

    /// Book title
    pub title: String,

    /// Book author
    pub author: String,

    /// Short marketing description
    pub description: Option<String>,

    /// Free-form category label (e.g. "productivity")
    pub category: Option<String>,

    /// Public URL of the cover image
    pub cover_image_url: Option<String>,

    /// Public URL of the audio narration
    pub audio_url: Option<String>,

    /// Full summary body
    pub content: Option<String>,

    /// Estimated reading time
    pub read_time_minutes: Option<i32>,

    /// Price in integer cents; 0 means free
    pub price: i64,

    /// Draft summaries are hidden from anonymous listings
    pub status: ContentStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a book summary
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookSummary {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub cover_image_url: Option<String>,
    pub audio_url: Option<String>,
    pub content: Option<String>,
    pub read_time_minutes: Option<i32>,
    #[serde(default)]
    pub price: i64,
    pub status: Option<ContentStatus>,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBookSummary {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub cover_image_url: Option<String>,
    pub audio_url: Option<String>,
    pub content: Option<String>,
    pub read_time_minutes: Option<i32>,
    pub price: Option<i64>,
    pub status: Option<ContentStatus>,
}

/// Listing filters; all optional and combinable
#[derive(Debug, Clone, Default)]
pub struct BookSummaryFilter {
    /// Exact category match
    pub category: Option<String>,

    /// Status filter; admins may pass this, anonymous callers are pinned
    /// to published by the route layer
    pub status: Option<ContentStatus>,

    /// Case-insensitive substring match against title and author
    pub search: Option<String>,
}

const SELECT_COLUMNS: &str = "id, title, author, description, category, cover_image_url, \
     audio_url, content, read_time_minutes, price, status, created_at, updated_at";

impl BookSummary {
    /// Creates a new book summary
    pub async fn create(pool: &PgPool, data: CreateBookSummary) -> Result<Self, sqlx::Error> {
        let summary = sqlx::query_as::<_, BookSummary>(
            r#"
            INSERT INTO book_summaries
                (title, author, description, category, cover_image_url, audio_url, content,
                 read_time_minutes, price, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, title, author, description, category, cover_image_url, audio_url,
                      content, read_time_minutes, price, status, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.author)
        .bind(data.description)
        .bind(data.category)
        .bind(data.cover_image_url)
        .bind(data.audio_url)
        .bind(data.content)
        .bind(data.read_time_minutes)
        .bind(data.price)
        .bind(data.status.unwrap_or(ContentStatus::Draft))
        .fetch_one(pool)
        .await?;

        Ok(summary)
    }

    /// Finds a book summary by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let summary = sqlx::query_as::<_, BookSummary>(&format!(
            "SELECT {SELECT_COLUMNS} FROM book_summaries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(summary)
    }

    /// Lists book summaries with optional filters, newest first
    pub async fn list(
        pool: &PgPool,
        filter: BookSummaryFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = format!("SELECT {SELECT_COLUMNS} FROM book_summaries WHERE 1=1");
        let mut bind_count = 0;

        if filter.category.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND category = ${}", bind_count));
        }
        if filter.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND status = ${}", bind_count));
        }
        if filter.search.is_some() {
            bind_count += 1;
            query.push_str(&format!(
                " AND (title ILIKE ${n} OR author ILIKE ${n})",
                n = bind_count
            ));
        }

        query.push_str(&format!(
            " ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        ));

        let mut q = sqlx::query_as::<_, BookSummary>(&query);

        if let Some(category) = filter.category {
            q = q.bind(category);
        }
        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(search) = filter.search {
            q = q.bind(format!("%{}%", search));
        }

        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Updates a book summary; absent fields are left unchanged
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateBookSummary,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE book_summaries SET updated_at = NOW()");
        let mut bind_count = 0;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.author.is_some() {
            bind_count += 1;
            query.push_str(&format!(", author = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.category.is_some() {
            bind_count += 1;
            query.push_str(&format!(", category = ${}", bind_count));
        }
        if data.cover_image_url.is_some() {
            bind_count += 1;
            query.push_str(&format!(", cover_image_url = ${}", bind_count));
        }
        if data.audio_url.is_some() {
            bind_count += 1;
            query.push_str(&format!(", audio_url = ${}", bind_count));
        }
        if data.content.is_some() {
            bind_count += 1;
            query.push_str(&format!(", content = ${}", bind_count));
        }
        if data.read_time_minutes.is_some() {
            bind_count += 1;
            query.push_str(&format!(", read_time_minutes = ${}", bind_count));
        }
        if data.price.is_some() {
            bind_count += 1;
            query.push_str(&format!(", price = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = ${} RETURNING {}",
            bind_count + 1,
            SELECT_COLUMNS
        ));

        let mut q = sqlx::query_as::<_, BookSummary>(&query);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(author) = data.author {
            q = q.bind(author);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(category) = data.category {
            q = q.bind(category);
        }
        if let Some(cover_image_url) = data.cover_image_url {
            q = q.bind(cover_image_url);
        }
        if let Some(audio_url) = data.audio_url {
            q = q.bind(audio_url);
        }
        if let Some(content) = data.content {
            q = q.bind(content);
        }
        if let Some(read_time_minutes) = data.read_time_minutes {
            q = q.bind(read_time_minutes);
        }
        if let Some(price) = data.price {
            q = q.bind(price);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        q.bind(id).fetch_optional(pool).await
    }

    /// Deletes a book summary and its referencing bookmarks and purchases
    ///
    /// Runs in one transaction so partial cleanup can never be observed.
    /// Returns false if the summary didn't exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM bookmarks WHERE item_type = $1 AND item_id = $2")
            .bind(ItemType::BookSummary)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM purchases WHERE item_type = $1 AND item_id = $2")
            .bind(ItemType::BookSummary)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM book_summaries WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_defaults_to_draft() {
        let data: CreateBookSummary = serde_json::from_str(
            r#"{"title": "Deep Work", "author": "Cal Newport"}"#,
        )
        .unwrap();
        assert_eq!(data.status.unwrap_or(ContentStatus::Draft), ContentStatus::Draft);
        assert_eq!(data.price, 0);
    }

    #[test]
    fn test_filter_defaults_to_unfiltered() {
        let filter = BookSummaryFilter::default();
        assert!(filter.category.is_none());
        assert!(filter.status.is_none());
        assert!(filter.search.is_none());
    }

    // Query building and cascades are covered by integration tests in tests/.
}
