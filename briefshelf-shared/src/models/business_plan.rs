/// Business plan template model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE business_plans (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     industry VARCHAR(100),
///     description TEXT,
///     cover_image_url TEXT,
///     document_url TEXT,
///     content TEXT,
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

/// A purchasable business plan template
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BusinessPlan {
    /// Unique ID (UUID v4)
    pub id: Uuid,

    /// Plan title
    pub title: String,

    /// Industry the template targets (e.g. "hospitality")
    pub industry: Option<String>,

    /// Short marketing description
    pub description: Option<String>,

    /// Public URL of the cover image
    pub cover_image_url: Option<String>,

    /// Public URL of the downloadable document
    pub document_url: Option<String>,

    /// Inline plan body
    pub content: Option<String>,

    /// Price in integer cents; 0 means free
    pub price: i64,

    /// Draft plans are hidden from anonymous listings
    pub status: ContentStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a business plan
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBusinessPlan {
    pub title: String,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub document_url: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub price: i64,
    pub status: Option<ContentStatus>,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBusinessPlan {
    pub title: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub document_url: Option<String>,
    pub content: Option<String>,
    pub price: Option<i64>,
    pub status: Option<ContentStatus>,
}

/// Listing filters; all optional and combinable
#[derive(Debug, Clone, Default)]
pub struct BusinessPlanFilter {
    /// Exact industry match
    pub industry: Option<String>,

    /// Status filter; anonymous callers are pinned to published by the
    /// route layer
    pub status: Option<ContentStatus>,

    /// Case-insensitive substring match against the title
    pub search: Option<String>,
}

const SELECT_COLUMNS: &str = "id, title, industry, description, cover_image_url, document_url, \
     content, price, status, created_at, updated_at";

impl BusinessPlan {
    /// Creates a new business plan
    pub async fn create(pool: &PgPool, data: CreateBusinessPlan) -> Result<Self, sqlx::Error> {
        let plan = sqlx::query_as::<_, BusinessPlan>(
            r#"
            INSERT INTO business_plans
                (title, industry, description, cover_image_url, document_url, content, price, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, industry, description, cover_image_url, document_url, content,
                      price, status, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.industry)
        .bind(data.description)
        .bind(data.cover_image_url)
        .bind(data.document_url)
        .bind(data.content)
        .bind(data.price)
        .bind(data.status.unwrap_or(ContentStatus::Draft))
        .fetch_one(pool)
        .await?;

        Ok(plan)
    }

    /// Finds a business plan by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let plan = sqlx::query_as::<_, BusinessPlan>(&format!(
            "SELECT {SELECT_COLUMNS} FROM business_plans WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(plan)
    }

    /// Lists business plans with optional filters, newest first
    pub async fn list(
        pool: &PgPool,
        filter: BusinessPlanFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = format!("SELECT {SELECT_COLUMNS} FROM business_plans WHERE 1=1");
        let mut bind_count = 0;

        if filter.industry.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND industry = ${}", bind_count));
        }
        if filter.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND status = ${}", bind_count));
        }
        if filter.search.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND title ILIKE ${}", bind_count));
        }

        query.push_str(&format!(
            " ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        ));

        let mut q = sqlx::query_as::<_, BusinessPlan>(&query);

        if let Some(industry) = filter.industry {
            q = q.bind(industry);
        }
        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(search) = filter.search {
            q = q.bind(format!("%{}%", search));
        }

        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Updates a business plan; absent fields are left unchanged
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateBusinessPlan,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE business_plans SET updated_at = NOW()");
        let mut bind_count = 0;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.industry.is_some() {
            bind_count += 1;
            query.push_str(&format!(", industry = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.cover_image_url.is_some() {
            bind_count += 1;
            query.push_str(&format!(", cover_image_url = ${}", bind_count));
        }
        if data.document_url.is_some() {
            bind_count += 1;
            query.push_str(&format!(", document_url = ${}", bind_count));
        }
        if data.content.is_some() {
            bind_count += 1;
            query.push_str(&format!(", content = ${}", bind_count));
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

        let mut q = sqlx::query_as::<_, BusinessPlan>(&query);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(industry) = data.industry {
            q = q.bind(industry);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(cover_image_url) = data.cover_image_url {
            q = q.bind(cover_image_url);
        }
        if let Some(document_url) = data.document_url {
            q = q.bind(document_url);
        }
        if let Some(content) = data.content {
            q = q.bind(content);
        }
        if let Some(price) = data.price {
            q = q.bind(price);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        q.bind(id).fetch_optional(pool).await
    }

    /// Deletes a business plan and its referencing bookmarks and purchases
    ///
    /// Runs in one transaction. Returns false if the plan didn't exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM bookmarks WHERE item_type = $1 AND item_id = $2")
            .bind(ItemType::BusinessPlan)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM purchases WHERE item_type = $1 AND item_id = $2")
            .bind(ItemType::BusinessPlan)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM business_plans WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
