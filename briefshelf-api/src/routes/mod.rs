/// Route handlers
///
/// One module per resource; routing lives in `app::build_router`.

pub mod auth;
pub mod blog_posts;
pub mod book_summaries;
pub mod bookmarks;
pub mod business_plans;
pub mod health;
pub mod purchases;
pub mod uploads;
pub mod users;

use briefshelf_shared::models::{
    book_summary::BookSummary, business_plan::BusinessPlan, purchase::ItemType,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::app::AppState;
use crate::error::{ApiError, ApiResult, ValidationErrorDetail};

/// Confirms a purchasable item exists and returns its price in cents
///
/// Shared by bookmark and purchase creation so both return a 404 for a
/// dangling item reference.
pub(crate) async fn find_item_price(
    state: &AppState,
    item_type: ItemType,
    item_id: Uuid,
) -> ApiResult<i64> {
    let price = match item_type {
        ItemType::BookSummary => BookSummary::find_by_id(&state.db, item_id)
            .await?
            .map(|s| s.price),
        ItemType::BusinessPlan => BusinessPlan::find_by_id(&state.db, item_id)
            .await?
            .map(|p| p.price),
    };

    price.ok_or_else(|| ApiError::NotFound("Content item not found".to_string()))
}

/// Maps validator failures to a 422 with per-field details
pub(crate) fn validation_error(e: ValidationErrors) -> ApiError {
    let errors: Vec<ValidationErrorDetail> = e
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::ValidationError(errors)
}

/// Common pagination query parameters
///
/// `limit` is clamped to 1..=100 and `offset` to >= 0 so a hostile
/// query string can't turn into an unbounded scan.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
