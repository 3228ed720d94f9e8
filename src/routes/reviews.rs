//! Review REST routes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use crate::models::{Review, ReviewFromDb, ReviewIn, ValidationError};
use crate::routes::auth::AuthUser;
use crate::services::review::{DEFAULT_PAGE_NUMBER, DEFAULT_PER_PAGE, ReviewError};
use crate::state::AppState;

// =============================================================================
// ERRORS
// =============================================================================

/// HTTP error carrying a status and a one-line detail, rendered as
/// `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    fn unprocessable(detail: impl Into<String>) -> Self {
        Self { status: StatusCode::UNPROCESSABLE_ENTITY, detail: detail.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        let status = review_error_to_status(&err);
        let detail = match err {
            // Unhandled store faults never leak driver messages to clients.
            ReviewError::Store(_) => "Internal Server Error".to_owned(),
            other => other.to_string(),
        };
        Self { status, detail }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::unprocessable(err.to_string())
    }
}

/// Body rejections keep axum's status (422 for bad fields, 400 for bad
/// syntax, 415 for a missing content type) but use the JSON error shape.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self { status: rejection.status(), detail: rejection.body_text() }
    }
}

/// Every query-string failure is a paging error, so it is always 422.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

pub(crate) fn review_error_to_status(err: &ReviewError) -> StatusCode {
    match err {
        ReviewError::Internal { .. } | ReviewError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ReviewError::Conflict { .. } => StatusCode::CONFLICT,
        ReviewError::NotFound { .. } => StatusCode::NOT_FOUND,
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page_number: Option<i64>,
    pub per_page: Option<i64>,
}

/// Resolve defaults and reject out-of-range paging parameters.
pub(crate) fn resolve_page(query: &PageQuery, max_per_page: Option<u32>) -> Result<(u32, u32), ApiError> {
    let page_number = match query.page_number {
        None => DEFAULT_PAGE_NUMBER,
        Some(n) => u32::try_from(n)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| ApiError::unprocessable("page_number must be greater than or equal to 1"))?,
    };

    let per_page = match query.per_page {
        None => DEFAULT_PER_PAGE,
        Some(n) => u32::try_from(n)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| ApiError::unprocessable("per_page must be greater than 0"))?,
    };

    if let Some(max) = max_per_page {
        if per_page > max {
            return Err(ApiError::unprocessable(format!("per_page must be less than or equal to {max}")));
        }
    }

    Ok((page_number, per_page))
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /api/v1/reviews`: list reviews page by page.
pub async fn list_reviews(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<ReviewFromDb>>, ApiError> {
    let Query(query) = query?;
    let (page_number, per_page) = resolve_page(&query, state.max_per_page)?;
    let reviews = state.reviews.get(page_number, per_page).await?;
    Ok(Json(reviews))
}

/// `POST /api/v1/reviews`: create a review as the authenticated user.
pub async fn create_review(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<ReviewIn>, JsonRejection>,
) -> Result<(StatusCode, Json<ReviewFromDb>), ApiError> {
    let Json(body) = body?;
    body.validate()?;
    let created = state.reviews.add(&auth.user_id, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/v1/reviews/{review_id}`: replace a review.
///
/// Responds with `null` when the submitted fields match what is stored.
pub async fn update_review(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(review_id): Path<String>,
    body: Result<Json<Review>, JsonRejection>,
) -> Result<Json<Option<ReviewFromDb>>, ApiError> {
    let Json(body) = body?;
    body.validate()?;
    let outcome = state.reviews.update(&review_id, body).await?;
    Ok(Json(outcome.into_option()))
}

/// `DELETE /api/v1/reviews/{review_id}`: delete a review.
pub async fn delete_review(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(review_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.reviews.remove(&review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "reviews_test.rs"]
mod tests;
