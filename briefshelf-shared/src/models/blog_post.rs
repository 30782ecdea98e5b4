/// Blog post model and database operations
///
/// Blog posts are free editorial content. They are addressable by slug as
/// well as by ID, and `published_at` is stamped the first time a post
/// moves to published.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE blog_posts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     slug VARCHAR(255) NOT NULL UNIQUE,
///     excerpt TEXT,
///     content TEXT,
///     cover_image_url TEXT,
///     author_name VARCHAR(255),
///     status content_status NOT NULL DEFAULT 'draft',
///     published_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::ContentStatus;

/// A blog post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BlogPost {
    /// Unique ID (UUID v4)
    pub id: Uuid,

    /// Post title
    pub title: String,

    /// URL-safe identifier, unique across all posts
    pub slug: String,

    /// Short teaser shown in listings
    pub excerpt: Option<String>,

    /// Full post body
    pub content: Option<String>,

    /// Public URL of the cover image
    pub cover_image_url: Option<String>,

    /// Display name of the author
    pub author_name: Option<String>,

    /// Draft posts are hidden from anonymous listings
    pub status: ContentStatus,

    /// Set on first publish, never cleared
    pub published_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a blog post
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlogPost {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub cover_image_url: Option<String>,
    pub author_name: Option<String>,
    pub status: Option<ContentStatus>,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBlogPost {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub cover_image_url: Option<String>,
    pub author_name: Option<String>,
    pub status: Option<ContentStatus>,
}

const SELECT_COLUMNS: &str = "id, title, slug, excerpt, content, cover_image_url, author_name, \
     status, published_at, created_at, updated_at";

impl BlogPost {
    /// Creates a new blog post
    ///
    /// Posts created directly as published get `published_at` stamped
    /// immediately. A duplicate slug surfaces as a unique violation.
    pub async fn create(pool: &PgPool, data: CreateBlogPost) -> Result<Self, sqlx::Error> {
        let status = data.status.unwrap_or(ContentStatus::Draft);

        let post = sqlx::query_as::<_, BlogPost>(
            r#"
            INSERT INTO blog_posts
                (title, slug, excerpt, content, cover_image_url, author_name, status, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7,
                    CASE WHEN $7 = 'published'::content_status THEN NOW() ELSE NULL END)
            RETURNING id, title, slug, excerpt, content, cover_image_url, author_name, status,
                      published_at, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.slug)
        .bind(data.excerpt)
        .bind(data.content)
        .bind(data.cover_image_url)
        .bind(data.author_name)
        .bind(status)
        .fetch_one(pool)
        .await?;

        Ok(post)
    }

    /// Finds a blog post by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let post = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {SELECT_COLUMNS} FROM blog_posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(post)
    }

    /// Finds a blog post by slug
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        let post = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {SELECT_COLUMNS} FROM blog_posts WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(post)
    }

    /// Lists blog posts with an optional status filter, newest first
    pub async fn list(
        pool: &PgPool,
        status: Option<ContentStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let posts = match status {
            Some(status) => {
                sqlx::query_as::<_, BlogPost>(&format!(
                    "SELECT {SELECT_COLUMNS} FROM blog_posts WHERE status = $1 \
                     ORDER BY created_at DESC LIMIT $2 OFFSET $3"
                ))
                .bind(status)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, BlogPost>(&format!(
                    "SELECT {SELECT_COLUMNS} FROM blog_posts \
                     ORDER BY created_at DESC LIMIT $1 OFFSET $2"
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(posts)
    }

    /// Updates a blog post; absent fields are left unchanged
    ///
    /// Moving to published stamps `published_at` if it's still NULL, so
    /// republishing keeps the original publication date.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateBlogPost,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE blog_posts SET updated_at = NOW()");
        let mut bind_count = 0;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.slug.is_some() {
            bind_count += 1;
            query.push_str(&format!(", slug = ${}", bind_count));
        }
        if data.excerpt.is_some() {
            bind_count += 1;
            query.push_str(&format!(", excerpt = ${}", bind_count));
        }
        if data.content.is_some() {
            bind_count += 1;
            query.push_str(&format!(", content = ${}", bind_count));
        }
        if data.cover_image_url.is_some() {
            bind_count += 1;
            query.push_str(&format!(", cover_image_url = ${}", bind_count));
        }
        if data.author_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", author_name = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(
                ", status = ${n}, published_at = CASE \
                 WHEN ${n} = 'published'::content_status AND published_at IS NULL \
                 THEN NOW() ELSE published_at END",
                n = bind_count
            ));
        }

        query.push_str(&format!(
            " WHERE id = ${} RETURNING {}",
            bind_count + 1,
            SELECT_COLUMNS
        ));

        let mut q = sqlx::query_as::<_, BlogPost>(&query);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(slug) = data.slug {
            q = q.bind(slug);
        }
        if let Some(excerpt) = data.excerpt {
            q = q.bind(excerpt);
        }
        if let Some(content) = data.content {
            q = q.bind(content);
        }
        if let Some(cover_image_url) = data.cover_image_url {
            q = q.bind(cover_image_url);
        }
        if let Some(author_name) = data.author_name {
            q = q.bind(author_name);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        q.bind(id).fetch_optional(pool).await
    }

    /// Deletes a blog post. Returns false if the post didn't exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Derives a URL-safe slug from a title
///
/// Lowercases, maps runs of non-alphanumeric characters to single
/// hyphens, and trims leading and trailing hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Ten Habits of Highly Effective Readers"), "ten-habits-of-highly-effective-readers");
    }

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(slugify("Rust & Go: A Comparison!"), "rust-go-a-comparison");
        assert_eq!(slugify("  leading -- and trailing  "), "leading-and-trailing");
    }

    #[test]
    fn test_slugify_empty_and_symbol_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_create_defaults_to_draft() {
        let data: CreateBlogPost =
            serde_json::from_str(r#"{"title": "First Post", "slug": "first-post"}"#).unwrap();
        assert!(data.status.is_none());
    }

    // published_at stamping is covered by integration tests in tests/.
}
