/// Business plan endpoints
///
/// # Endpoints
///
/// - `GET /v1/business-plans` - List (public; drafts admin only)
/// - `GET /v1/business-plans/:id` - Fetch one (public; drafts admin only)
/// - `POST /v1/business-plans` - Create (admin)
/// - `PUT /v1/business-plans/:id` - Update (admin)
/// - `DELETE /v1/business-plans/:id` - Delete (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::Pagination,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use briefshelf_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::{
        business_plan::{
            BusinessPlan, BusinessPlanFilter, CreateBusinessPlan, UpdateBusinessPlan,
        },
        ContentStatus,
    },
};
use serde::Deserialize;
use uuid::Uuid;

/// Listing query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub industry: Option<String>,
    pub status: Option<ContentStatus>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn effective_status(
    auth: &Option<Extension<AuthContext>>,
    requested: Option<ContentStatus>,
) -> Option<ContentStatus> {
    match auth {
        Some(Extension(ctx)) if ctx.is_admin() => requested,
        _ => Some(ContentStatus::Published),
    }
}

/// Lists business plans with optional industry, status, and search filters
pub async fn list_business_plans(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<BusinessPlan>>> {
    let filter = BusinessPlanFilter {
        industry: query.industry,
        status: effective_status(&auth, query.status),
        search: query.search,
    };

    let pagination = Pagination {
        limit: query.limit,
        offset: query.offset,
    };
    let plans = BusinessPlan::list(
        &state.db,
        filter,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(plans))
}

/// Fetches a single business plan; drafts are admin only
pub async fn get_business_plan(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BusinessPlan>> {
    let plan = BusinessPlan::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Business plan not found".to_string()))?;

    let is_admin = matches!(&auth, Some(Extension(ctx)) if ctx.is_admin());
    if plan.status == ContentStatus::Draft && !is_admin {
        return Err(ApiError::NotFound("Business plan not found".to_string()));
    }

    Ok(Json(plan))
}

/// Creates a business plan (admin only)
pub async fn create_business_plan(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateBusinessPlan>,
) -> ApiResult<Json<BusinessPlan>> {
    require_admin(&auth)?;

    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title must not be empty".to_string()));
    }
    if req.price < 0 {
        return Err(ApiError::BadRequest("Price must not be negative".to_string()));
    }

    let plan = BusinessPlan::create(&state.db, req).await?;

    tracing::info!(plan_id = %plan.id, "Business plan created");

    Ok(Json(plan))
}

/// Updates a business plan (admin only)
pub async fn update_business_plan(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBusinessPlan>,
) -> ApiResult<Json<BusinessPlan>> {
    require_admin(&auth)?;

    if matches!(&req.title, Some(t) if t.trim().is_empty()) {
        return Err(ApiError::BadRequest("Title must not be empty".to_string()));
    }
    if matches!(req.price, Some(p) if p < 0) {
        return Err(ApiError::BadRequest("Price must not be negative".to_string()));
    }

    let plan = BusinessPlan::update(&state.db, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Business plan not found".to_string()))?;

    Ok(Json(plan))
}

/// Deletes a business plan and its bookmarks and purchases (admin only)
pub async fn delete_business_plan(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    require_admin(&auth)?;

    let deleted = BusinessPlan::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Business plan not found".to_string()));
    }

    tracing::info!(plan_id = %id, "Business plan deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
