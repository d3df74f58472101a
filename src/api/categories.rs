//! Category and genre endpoints.
//!
//! Both taxonomies share the `{name, slug}` shape and are addressed by slug.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::{ApiJson, validate_slug_param};
use super::{ApiError, ApiResponse, AppState, CategoryDto, GenreDto, TaxonomyRequest};
use crate::services::CatalogError;

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(fields) => Self::InvalidFields(fields),
            CatalogError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            CatalogError::Conflict(msg) => Self::Conflict(msg),
            CatalogError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

/// `GET /api/categories`
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CategoryDto>>>, ApiError> {
    let categories = state.catalog_service().list_categories().await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// `POST /api/categories`
///
/// # Errors
/// 400 with `fields` for an invalid payload, 409 if the slug is taken.
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<TaxonomyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryDto>>), ApiError> {
    let category = state.catalog_service().create_category(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(category))))
}

/// `DELETE /api/categories/{slug}`
///
/// Titles in the category are kept with their category cleared.
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    let slug = validate_slug_param(&slug)?;
    state.catalog_service().delete_category(slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/genres`
pub async fn list_genres(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<GenreDto>>>, ApiError> {
    let genres = state.catalog_service().list_genres().await?;
    Ok(Json(ApiResponse::success(genres)))
}

/// `POST /api/genres`
pub async fn create_genre(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<TaxonomyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GenreDto>>), ApiError> {
    let genre = state.catalog_service().create_genre(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(genre))))
}

/// `DELETE /api/genres/{slug}`
pub async fn delete_genre(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    let slug = validate_slug_param(&slug)?;
    state.catalog_service().delete_genre(slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
