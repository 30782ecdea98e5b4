/// Purchase model, entitlement checks, and status bookkeeping
///
/// A purchase ties a user to a purchasable content item. Entitlement means
/// a `completed` purchase exists for the (user, item type, item) key.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE purchases (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     item_type item_type NOT NULL,
///     item_id UUID NOT NULL,
///     amount BIGINT NOT NULL CHECK (amount >= 0),
///     currency VARCHAR(3) NOT NULL DEFAULT 'usd',
///     status purchase_status NOT NULL DEFAULT 'pending',
///     payment_id VARCHAR(255),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE UNIQUE INDEX uq_purchases_completed
///     ON purchases (user_id, item_type, item_id)
///     WHERE status = 'completed';
/// ```
///
/// The partial unique index enforces at most one completed purchase per
/// key. The check-then-insert in [`Purchase::record`] catches the common
/// case with a friendly error; the index catches the concurrent one.
///
/// # Status lifecycle
///
/// ```text
/// pending ──► completed ──► refunded
///    │
///    └──────► failed
/// ```
///
/// `failed` and `refunded` are terminal. Writing the current status again
/// is accepted as a no-op.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Discriminator for purchasable content categories
///
/// Serialized as `book-summary` / `business-plan` on the wire, stored as
/// `book_summary` / `business_plan` in Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_type", rename_all = "snake_case")]
#[serde(rename_all = "kebab-case")]
pub enum ItemType {
    BookSummary,
    BusinessPlan,
}

/// Purchase lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "purchase_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Completed => "completed",
            PurchaseStatus::Failed => "failed",
            PurchaseStatus::Refunded => "refunded",
        }
    }

    /// Whether no further transitions are allowed from this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, PurchaseStatus::Failed | PurchaseStatus::Refunded)
    }

    /// Validates a status transition
    ///
    /// Allowed moves: `pending → completed`, `pending → failed`,
    /// `completed → refunded`. Writing the same status again is a no-op
    /// and allowed.
    pub fn can_transition_to(&self, next: PurchaseStatus) -> bool {
        if *self == next {
            return true;
        }

        matches!(
            (self, next),
            (PurchaseStatus::Pending, PurchaseStatus::Completed)
                | (PurchaseStatus::Pending, PurchaseStatus::Failed)
                | (PurchaseStatus::Completed, PurchaseStatus::Refunded)
        )
    }
}

/// Error type for purchase operations
#[derive(Debug, thiserror::Error)]
pub enum PurchaseError {
    /// A completed purchase already exists for this (user, item) key
    #[error("Item already purchased")]
    AlreadyPurchased,

    /// Purchase row not found
    #[error("Purchase not found")]
    NotFound,

    /// Illegal status transition
    #[error("Cannot change purchase status from {from} to {to}", from = .from.as_str(), to = .to.as_str())]
    InvalidTransition {
        from: PurchaseStatus,
        to: PurchaseStatus,
    },

    /// Underlying database error
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Purchase record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Purchase {
    /// Unique purchase ID (UUID v4)
    pub id: Uuid,

    /// Purchasing user
    pub user_id: Uuid,

    /// Content category of the purchased item
    pub item_type: ItemType,

    /// ID of the purchased item
    pub item_id: Uuid,

    /// Amount paid, in integer cents
    pub amount: i64,

    /// ISO 4217 currency code (lowercase)
    pub currency: String,

    /// Lifecycle status
    pub status: PurchaseStatus,

    /// Opaque payment reference from the client (no gateway verification)
    pub payment_id: Option<String>,

    /// When the purchase was recorded
    pub created_at: DateTime<Utc>,

    /// When the purchase was last updated (status changes)
    pub updated_at: DateTime<Utc>,
}

/// Input for recording a new purchase
#[derive(Debug, Clone)]
pub struct CreatePurchase {
    pub user_id: Uuid,
    pub item_type: ItemType,
    pub item_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub status: PurchaseStatus,
    pub payment_id: Option<String>,
}

/// Result of an entitlement check
#[derive(Debug, Clone, Serialize)]
pub struct Entitlement {
    /// Whether a completed purchase exists for the key
    pub purchased: bool,

    /// The completed purchase record, if any
    pub purchase: Option<Purchase>,
}

impl Purchase {
    /// Records a purchase, rejecting duplicates for the same key
    ///
    /// The existence check and insert run in one transaction. Two
    /// concurrent calls can both pass the check; the loser then trips the
    /// `uq_purchases_completed` index and surfaces as a database error the
    /// caller maps to a conflict.
    ///
    /// # Errors
    ///
    /// - [`PurchaseError::AlreadyPurchased`] if a completed purchase
    ///   already exists for (user, item type, item)
    /// - [`PurchaseError::Database`] for constraint or connection failures
    pub async fn record(pool: &PgPool, data: CreatePurchase) -> Result<Self, PurchaseError> {
        let mut tx = pool.begin().await?;

        let existing: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM purchases
            WHERE user_id = $1 AND item_type = $2 AND item_id = $3
              AND status = 'completed'
            "#,
        )
        .bind(data.user_id)
        .bind(data.item_type)
        .bind(data.item_id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            return Err(PurchaseError::AlreadyPurchased);
        }

        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO purchases (user_id, item_type, item_id, amount, currency, status, payment_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, item_type, item_id, amount, currency, status, payment_id,
                      created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.item_type)
        .bind(data.item_id)
        .bind(data.amount)
        .bind(data.currency)
        .bind(data.status)
        .bind(data.payment_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(purchase)
    }

    /// Finds a purchase by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, user_id, item_type, item_id, amount, currency, status, payment_id,
                   created_at, updated_at
            FROM purchases
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(purchase)
    }

    /// Checks whether a user is entitled to a content item
    ///
    /// Single-row lookup for a completed purchase. No caching, no TTL.
    pub async fn check_entitlement(
        pool: &PgPool,
        user_id: Uuid,
        item_type: ItemType,
        item_id: Uuid,
    ) -> Result<Entitlement, sqlx::Error> {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, user_id, item_type, item_id, amount, currency, status, payment_id,
                   created_at, updated_at
            FROM purchases
            WHERE user_id = $1 AND item_type = $2 AND item_id = $3
              AND status = 'completed'
            "#,
        )
        .bind(user_id)
        .bind(item_type)
        .bind(item_id)
        .fetch_optional(pool)
        .await?;

        Ok(Entitlement {
            purchased: purchase.is_some(),
            purchase,
        })
    }

    /// Updates a purchase's status, enforcing the transition table
    ///
    /// Only `status` and `updated_at` change; every other field is left
    /// untouched. Writing the current status again returns the row as-is.
    /// The update is conditioned on the status the transition was checked
    /// against; when a concurrent writer changes the row in between, the
    /// check reruns against the status that won, so two racing updates
    /// can never produce a transition the table forbids.
    ///
    /// # Errors
    ///
    /// - [`PurchaseError::NotFound`] if the purchase doesn't exist
    /// - [`PurchaseError::InvalidTransition`] for illegal moves (e.g.
    ///   `refunded → completed`)
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        new_status: PurchaseStatus,
    ) -> Result<Self, PurchaseError> {
        loop {
            let purchase = Self::find_by_id(pool, id)
                .await?
                .ok_or(PurchaseError::NotFound)?;

            if !purchase.status.can_transition_to(new_status) {
                return Err(PurchaseError::InvalidTransition {
                    from: purchase.status,
                    to: new_status,
                });
            }

            if purchase.status == new_status {
                return Ok(purchase);
            }

            let updated = sqlx::query_as::<_, Purchase>(
                r#"
                UPDATE purchases
                SET status = $2, updated_at = NOW()
                WHERE id = $1 AND status = $3
                RETURNING id, user_id, item_type, item_id, amount, currency, status, payment_id,
                          created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(new_status)
            .bind(purchase.status)
            .fetch_optional(pool)
            .await?;

            if let Some(updated) = updated {
                return Ok(updated);
            }
            // Lost the race to another writer; recheck from the new status.
        }
    }

    /// Lists a user's purchases, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, user_id, item_type, item_id, amount, currency, status, payment_id,
                   created_at, updated_at
            FROM purchases
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(purchases)
    }

    /// Lists all purchases with an optional status filter, newest first
    pub async fn list(
        pool: &PgPool,
        status: Option<PurchaseStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let purchases = match status {
            Some(status) => {
                sqlx::query_as::<_, Purchase>(
                    r#"
                    SELECT id, user_id, item_type, item_id, amount, currency, status, payment_id,
                           created_at, updated_at
                    FROM purchases
                    WHERE status = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(status)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Purchase>(
                    r#"
                    SELECT id, user_id, item_type, item_id, amount, currency, status, payment_id,
                           created_at, updated_at
                    FROM purchases
                    ORDER BY created_at DESC
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(purchases)
    }
}
