use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::domain::rules::{FieldError, validate_not_blank, validate_slug, validate_year};
use crate::models::review::{Comment, Review};
use crate::models::taxonomy::{Category, Genre};
use crate::models::title::Title;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            fields: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            fields: None,
        }
    }

    pub fn invalid(message: impl Into<String>, fields: Vec<FieldError>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            fields: Some(fields),
        }
    }
}

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Read models
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDto {
    pub name: String,
    pub slug: String,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            name: category.name,
            slug: category.slug,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreDto {
    pub name: String,
    pub slug: String,
}

impl From<Genre> for GenreDto {
    fn from(genre: Genre) -> Self {
        Self {
            name: genre.name,
            slug: genre.slug,
        }
    }
}

/// Public shape of a title. Reviews are summarised by `rating` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleDto {
    pub id: i32,
    pub name: String,
    pub year: Option<i16>,
    /// Mean review score, `null` while the title has no reviews.
    pub rating: Option<f64>,
    pub description: Option<String>,
    /// Genre ids.
    pub genre: Vec<i32>,
    /// Category id.
    pub category: Option<i32>,
}

impl TitleDto {
    #[must_use]
    pub fn from_title(title: Title, rating: Option<f64>) -> Self {
        Self {
            id: title.id,
            genre: title.genre_ids(),
            category: title.category.as_ref().map(|c| c.id),
            name: title.name,
            year: title.year,
            rating,
            description: title.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDto {
    pub id: i32,
    pub text: String,
    pub author: String,
    pub score: i16,
    pub pub_date: String,
}

impl From<Review> for ReviewDto {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            text: review.text,
            author: review.author,
            score: review.score,
            pub_date: review.pub_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDto {
    pub id: i32,
    pub text: String,
    pub author: String,
    pub pub_date: String,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            author: comment.author,
            pub_date: comment.pub_date,
        }
    }
}

// ============================================================================
// Write requests
// ============================================================================

/// Body of `POST /categories` and `POST /genres`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TaxonomyRequest {
    #[validate(required, length(max = 200), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(required, length(min = 1, max = 50), custom(function = "validate_slug"))]
    pub slug: Option<String>,
}

/// Body of `POST /titles`; also the merged form a partial update is checked as.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TitleRequest {
    #[validate(required, length(max = 200), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(range(min = 0), custom(function = "validate_year"))]
    pub year: Option<i32>,
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Vec<i32>,
    pub category: Option<i32>,
}

/// Body of `PATCH /titles/{id}`. Absent keys keep their value; `null` clears
/// nullable columns.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitlePatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub genre: Option<Vec<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<i32>>,
}

impl TitlePatch {
    /// Overlays the patch on the current state of a title.
    #[must_use]
    pub fn merge_into(self, current: &Title) -> TitleRequest {
        TitleRequest {
            name: Some(self.name.unwrap_or_else(|| current.name.clone())),
            year: self.year.unwrap_or(current.year.map(i32::from)),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            genre: self.genre.unwrap_or_else(|| current.genre_ids()),
            category: self
                .category
                .unwrap_or_else(|| current.category.as_ref().map(|c| c.id)),
        }
    }
}

/// Body of `POST /titles/{id}/reviews`. An omitted score defaults to 10.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(required, custom(function = "validate_not_blank"))]
    pub text: Option<String>,
    #[validate(range(min = 1, max = 10))]
    pub score: Option<i32>,
}

/// Body of `PATCH /titles/{id}/reviews/{review_id}`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReviewPatch {
    #[validate(custom(function = "validate_not_blank"))]
    pub text: Option<String>,
    #[validate(range(min = 1, max = 10))]
    pub score: Option<i32>,
}

/// Body of comment create and update requests.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(required, custom(function = "validate_not_blank"))]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleListQuery {
    pub category: Option<String>,
    pub genre: Option<String>,
    pub name: Option<String>,
    pub year: Option<i16>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}
