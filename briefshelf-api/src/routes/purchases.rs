/// Purchase and entitlement endpoints
///
/// # Endpoints
///
/// - `POST /v1/purchases` - Record a purchase (self; admin for any user)
/// - `GET /v1/purchases` - List all purchases (admin, status filter)
/// - `GET /v1/purchases/user/:user_id` - A user's purchase history (self or admin)
/// - `GET /v1/purchases/check/:user_id/:item_type/:item_id` - Entitlement check (self or admin)
/// - `PUT /v1/purchases/:id/status` - Change status (admin, transition table)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{find_item_price, Pagination},
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use briefshelf_shared::{
    auth::{
        authorization::{require_admin, require_self_or_admin},
        middleware::AuthContext,
    },
    models::purchase::{
        CreatePurchase, Entitlement, ItemType, Purchase, PurchaseStatus,
    },
};
use serde::Deserialize;
use uuid::Uuid;

/// Record purchase request
///
/// `user_id` defaults to the caller; setting it to someone else requires
/// the admin role. `amount` defaults to the item's current price and
/// `status` to completed, since payment happens client-side and this
/// endpoint only books the result.
#[derive(Debug, Deserialize)]
pub struct RecordPurchaseRequest {
    pub user_id: Option<Uuid>,
    pub item_type: ItemType,
    pub item_id: Uuid,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub status: Option<PurchaseStatus>,
    pub payment_id: Option<String>,
}

/// Admin listing query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<PurchaseStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Status update request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: PurchaseStatus,
}

/// Records a purchase
///
/// # Errors
///
/// - `400 Bad Request`: The body doesn't deserialize (unknown item type
///   or status), a completed purchase for the same item already exists,
///   or the amount is negative
/// - `404 Not Found`: The referenced item doesn't exist
/// - `409 Conflict`: A concurrent request completed the same purchase
///   first (unique index)
pub async fn record_purchase(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<RecordPurchaseRequest>, JsonRejection>,
) -> ApiResult<Json<Purchase>> {
    let Json(req) = payload?;

    let user_id = req.user_id.unwrap_or(auth.user_id);
    require_self_or_admin(&auth, user_id)?;

    let item_price = find_item_price(&state, req.item_type, req.item_id).await?;

    let amount = req.amount.unwrap_or(item_price);
    if amount < 0 {
        return Err(ApiError::BadRequest(
            "Amount must not be negative".to_string(),
        ));
    }

    let purchase = Purchase::record(
        &state.db,
        CreatePurchase {
            user_id,
            item_type: req.item_type,
            item_id: req.item_id,
            amount,
            currency: req.currency.unwrap_or_else(|| "usd".to_string()),
            status: req.status.unwrap_or(PurchaseStatus::Completed),
            payment_id: req.payment_id,
        },
    )
    .await?;

    tracing::info!(
        purchase_id = %purchase.id,
        user_id = %purchase.user_id,
        item_id = %purchase.item_id,
        "Purchase recorded"
    );

    Ok(Json(purchase))
}

/// Lists all purchases with an optional status filter (admin only)
pub async fn list_purchases(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Purchase>>> {
    require_admin(&auth)?;

    let pagination = Pagination {
        limit: query.limit,
        offset: query.offset,
    };
    let purchases = Purchase::list(
        &state.db,
        query.status,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(purchases))
}

/// Lists a user's purchases, newest first (self or admin)
pub async fn list_user_purchases(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Purchase>>> {
    require_self_or_admin(&auth, user_id)?;

    let purchases = Purchase::list_by_user(&state.db, user_id).await?;

    Ok(Json(purchases))
}

/// Checks whether a user owns a content item (self or admin)
///
/// Responds `{ "purchased": bool, "purchase": {...} | null }`. The item
/// type is the wire form, e.g. `book-summary`.
pub async fn check_entitlement(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((user_id, item_type, item_id)): Path<(Uuid, ItemType, Uuid)>,
) -> ApiResult<Json<Entitlement>> {
    require_self_or_admin(&auth, user_id)?;

    let entitlement = Purchase::check_entitlement(&state.db, user_id, item_type, item_id).await?;

    Ok(Json(entitlement))
}

/// Changes a purchase's status (admin only)
///
/// Allowed moves: pending to completed or failed, completed to
/// refunded. Re-sending the current status is a no-op. Anything else,
/// including a status outside the known set, is a 400.
pub async fn update_purchase_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<Purchase>> {
    require_admin(&auth)?;
    let Json(req) = payload?;

    let purchase = Purchase::update_status(&state.db, id, req.status).await?;

    tracing::info!(
        purchase_id = %purchase.id,
        status = purchase.status.as_str(),
        "Purchase status updated"
    );

    Ok(Json(purchase))
}
