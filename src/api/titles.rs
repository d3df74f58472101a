//! Title endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::{ApiJson, validate_id, validate_limit};
use super::{ApiError, ApiResponse, AppState, TitleDto, TitleListQuery, TitlePatch, TitleRequest};
use crate::db::TitleFilter;
use crate::domain::TitleId;

/// Lists titles, newest first, each with its rating.
///
/// # Endpoint
/// `GET /api/titles`
///
/// # Query Parameters
/// - `category`: category slug
/// - `genre`: genre slug
/// - `name`: substring of the title name
/// - `year`: exact release year
/// - `limit` / `offset`: paging (limit 1..=1000)
pub async fn list_titles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TitleListQuery>,
) -> Result<Json<ApiResponse<Vec<TitleDto>>>, ApiError> {
    let limit = query.limit.map(validate_limit).transpose()?;

    let filter = TitleFilter {
        category: query.category,
        genre: query.genre,
        name: query.name,
        year: query.year,
        limit,
        offset: query.offset,
    };

    let titles = state.catalog_service().list_titles(filter).await?;
    Ok(Json(ApiResponse::success(titles)))
}

/// `POST /api/titles`
///
/// # Errors
/// - 400 with `fields` for a missing name or a future year
/// - 404 when the category or a genre id does not exist
pub async fn create_title(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<TitleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TitleDto>>), ApiError> {
    let title = state.catalog_service().create_title(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(title))))
}

/// `GET /api/titles/{id}`
pub async fn get_title(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TitleDto>>, ApiError> {
    let id = TitleId::new(validate_id("title", id)?);
    let title = state.catalog_service().get_title(id).await?;
    Ok(Json(ApiResponse::success(title)))
}

/// `PATCH /api/titles/{id}`
pub async fn update_title(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    ApiJson(patch): ApiJson<TitlePatch>,
) -> Result<Json<ApiResponse<TitleDto>>, ApiError> {
    let id = TitleId::new(validate_id("title", id)?);
    let title = state.catalog_service().update_title(id, patch).await?;
    Ok(Json(ApiResponse::success(title)))
}

/// `DELETE /api/titles/{id}`
///
/// Reviews of the title and their comments go with it.
pub async fn delete_title(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let id = TitleId::new(validate_id("title", id)?);
    state.catalog_service().delete_title(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
