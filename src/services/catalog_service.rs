//! Domain service for the catalog: categories, genres and titles.
//!
//! Handlers talk to [`CatalogService`]; the store behind it is an
//! implementation detail of [`super::SeaOrmCatalogService`].

use crate::api::types::{CategoryDto, GenreDto, TaxonomyRequest, TitleDto, TitlePatch, TitleRequest};
use crate::db::TitleFilter;
use crate::domain::TitleId;
use crate::domain::rules::{FieldError, field_errors};
use thiserror::Error;
use validator::ValidationErrors;

/// Domain errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl CatalogError {
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<ValidationErrors> for CatalogError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(field_errors(&errors))
    }
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Catalog operations exposed to the API and the CLI.
///
/// # Examples
///
/// ```rust,ignore
/// use yamdb::services::{CatalogError, CatalogService};
/// use yamdb::domain::TitleId;
/// use std::sync::Arc;
///
/// async fn example(service: Arc<dyn CatalogService>) -> Result<(), CatalogError> {
///     let title = service.get_title(TitleId::new(1)).await?;
///     println!("{} is rated {:?}", title.name, title.rating);
///     Ok(())
/// }
/// ```
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// Lists categories, newest first.
    async fn list_categories(&self) -> Result<Vec<CategoryDto>, CatalogError>;

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Validation`] for a missing or malformed name or slug
    /// - [`CatalogError::Conflict`] when the slug is taken
    async fn create_category(&self, request: TaxonomyRequest) -> Result<CategoryDto, CatalogError>;

    /// Deletes a category. Titles that referenced it keep existing with no category.
    async fn delete_category(&self, slug: &str) -> Result<(), CatalogError>;

    /// Lists genres, newest first.
    async fn list_genres(&self) -> Result<Vec<GenreDto>, CatalogError>;

    /// Creates a genre.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Validation`] for a missing or malformed name or slug
    /// - [`CatalogError::Conflict`] when the slug is taken
    async fn create_genre(&self, request: TaxonomyRequest) -> Result<GenreDto, CatalogError>;

    /// Deletes a genre and its title links.
    async fn delete_genre(&self, slug: &str) -> Result<(), CatalogError>;

    /// Lists titles matching `filter` with their ratings, newest first.
    async fn list_titles(&self, filter: TitleFilter) -> Result<Vec<TitleDto>, CatalogError>;

    /// Fetches a title with its current rating.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the title does not exist.
    async fn get_title(&self, id: TitleId) -> Result<TitleDto, CatalogError>;

    /// Creates a title.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Validation`] for a missing name, a name over 200
    ///   characters, or a year that is negative or later than the current year
    /// - [`CatalogError::NotFound`] when the category or a genre does not exist
    async fn create_title(&self, request: TitleRequest) -> Result<TitleDto, CatalogError>;

    /// Applies a partial update. The merged result is validated as a whole.
    async fn update_title(&self, id: TitleId, patch: TitlePatch) -> Result<TitleDto, CatalogError>;

    /// Deletes a title together with its reviews and their comments.
    async fn delete_title(&self, id: TitleId) -> Result<(), CatalogError>;
}
