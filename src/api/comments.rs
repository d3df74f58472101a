//! Comment endpoints, nested under a review.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::reviews::review_path;
use super::validation::{ApiJson, validate_id};
use super::{ApiError, ApiResponse, AppState, CommentDto, CommentRequest};
use crate::domain::CommentId;
use crate::models::user::User;

/// `GET /api/titles/{id}/reviews/{review_id}/comments`
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<Vec<CommentDto>>>, ApiError> {
    let (title, review) = review_path(title_id, review_id)?;
    let comments = state.review_service().list_comments(title, review).await?;
    Ok(Json(ApiResponse::success(comments)))
}

/// `POST /api/titles/{id}/reviews/{review_id}/comments`
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path((title_id, review_id)): Path<(i32, i32)>,
    ApiJson(payload): ApiJson<CommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentDto>>), ApiError> {
    let (title, review) = review_path(title_id, review_id)?;
    let comment = state
        .review_service()
        .create_comment(title, review, &user, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(comment))))
}

/// `GET /api/titles/{id}/reviews/{review_id}/comments/{comment_id}`
pub async fn get_comment(
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id, comment_id)): Path<(i32, i32, i32)>,
) -> Result<Json<ApiResponse<CommentDto>>, ApiError> {
    let (title, review) = review_path(title_id, review_id)?;
    let id = CommentId::new(validate_id("comment", comment_id)?);
    let comment = state
        .review_service()
        .get_comment(title, review, id)
        .await?;
    Ok(Json(ApiResponse::success(comment)))
}

/// `PATCH /api/titles/{id}/reviews/{review_id}/comments/{comment_id}`
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id, comment_id)): Path<(i32, i32, i32)>,
    ApiJson(payload): ApiJson<CommentRequest>,
) -> Result<Json<ApiResponse<CommentDto>>, ApiError> {
    let (title, review) = review_path(title_id, review_id)?;
    let id = CommentId::new(validate_id("comment", comment_id)?);
    let comment = state
        .review_service()
        .update_comment(title, review, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(comment)))
}

/// `DELETE /api/titles/{id}/reviews/{review_id}/comments/{comment_id}`
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id, comment_id)): Path<(i32, i32, i32)>,
) -> Result<StatusCode, ApiError> {
    let (title, review) = review_path(title_id, review_id)?;
    let id = CommentId::new(validate_id("comment", comment_id)?);
    state
        .review_service()
        .delete_comment(title, review, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
