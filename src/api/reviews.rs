//! Review endpoints, nested under a title.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::{ApiJson, validate_id};
use super::{ApiError, ApiResponse, AppState, ReviewDto, ReviewPatch, ReviewRequest};
use crate::domain::{ReviewId, TitleId};
use crate::models::user::User;
use crate::services::ReviewError;

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::Validation(fields) => Self::InvalidFields(fields),
            ReviewError::TitleNotFound(id) => Self::not_found("Title", id),
            ReviewError::ReviewNotFound(id) => Self::not_found("Review", id),
            ReviewError::CommentNotFound(id) => Self::not_found("Comment", id),
            err @ ReviewError::AlreadyReviewed { .. } => Self::Conflict(err.to_string()),
            ReviewError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

pub(super) fn review_path(title_id: i32, review_id: i32) -> Result<(TitleId, ReviewId), ApiError> {
    Ok((
        TitleId::new(validate_id("title", title_id)?),
        ReviewId::new(validate_id("review", review_id)?),
    ))
}

/// `GET /api/titles/{id}/reviews`
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(title_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<ReviewDto>>>, ApiError> {
    let title = TitleId::new(validate_id("title", title_id)?);
    let reviews = state.review_service().list_reviews(title).await?;
    Ok(Json(ApiResponse::success(reviews)))
}

/// `POST /api/titles/{id}/reviews`
///
/// The caller becomes the author.
///
/// # Errors
/// - 400 with `fields` for empty text or a score outside 1..=10
/// - 404 if the title does not exist
/// - 409 if the caller already reviewed this title
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(title_id): Path<i32>,
    ApiJson(payload): ApiJson<ReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewDto>>), ApiError> {
    let title = TitleId::new(validate_id("title", title_id)?);
    let review = state
        .review_service()
        .create_review(title, &user, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(review))))
}

/// `GET /api/titles/{id}/reviews/{review_id}`
pub async fn get_review(
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<ReviewDto>>, ApiError> {
    let (title, review) = review_path(title_id, review_id)?;
    let review = state.review_service().get_review(title, review).await?;
    Ok(Json(ApiResponse::success(review)))
}

/// `PATCH /api/titles/{id}/reviews/{review_id}`
pub async fn update_review(
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id)): Path<(i32, i32)>,
    ApiJson(patch): ApiJson<ReviewPatch>,
) -> Result<Json<ApiResponse<ReviewDto>>, ApiError> {
    let (title, review) = review_path(title_id, review_id)?;
    let review = state
        .review_service()
        .update_review(title, review, patch)
        .await?;
    Ok(Json(ApiResponse::success(review)))
}

/// `DELETE /api/titles/{id}/reviews/{review_id}`
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    let (title, review) = review_path(title_id, review_id)?;
    state.review_service().delete_review(title, review).await?;
    Ok(StatusCode::NO_CONTENT)
}
