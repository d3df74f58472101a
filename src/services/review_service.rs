//! Domain service for reviews and their comments.
//!
//! Every review is addressed under its title and every comment under its
//! review; a child looked up under the wrong parent is reported as not found.

use crate::api::types::{CommentDto, CommentRequest, ReviewDto, ReviewPatch, ReviewRequest};
use crate::domain::rules::{FieldError, field_errors};
use crate::domain::{CommentId, ReviewId, TitleId};
use crate::models::user::User;
use thiserror::Error;
use validator::ValidationErrors;

/// Domain errors for review and comment operations.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Title not found: {0}")]
    TitleNotFound(TitleId),

    #[error("Review not found: {0}")]
    ReviewNotFound(ReviewId),

    #[error("Comment not found: {0}")]
    CommentNotFound(CommentId),

    #[error("User {author} has already reviewed title {title}")]
    AlreadyReviewed { title: TitleId, author: String },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<ValidationErrors> for ReviewError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(field_errors(&errors))
    }
}

impl From<sea_orm::DbErr> for ReviewError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ReviewError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[async_trait::async_trait]
pub trait ReviewService: Send + Sync {
    /// Lists a title's reviews, newest first.
    async fn list_reviews(&self, title: TitleId) -> Result<Vec<ReviewDto>, ReviewError>;

    async fn get_review(&self, title: TitleId, id: ReviewId) -> Result<ReviewDto, ReviewError>;

    /// Publishes a review by `author`. The score defaults to 10 when omitted.
    ///
    /// # Errors
    ///
    /// - [`ReviewError::Validation`] for empty text or a score outside 1..=10
    /// - [`ReviewError::TitleNotFound`] if the title does not exist
    /// - [`ReviewError::AlreadyReviewed`] if `author` already reviewed the title
    async fn create_review(
        &self,
        title: TitleId,
        author: &User,
        request: ReviewRequest,
    ) -> Result<ReviewDto, ReviewError>;

    /// Updates text and/or score. Omitted fields keep their value.
    async fn update_review(
        &self,
        title: TitleId,
        id: ReviewId,
        patch: ReviewPatch,
    ) -> Result<ReviewDto, ReviewError>;

    /// Deletes a review and its comments.
    async fn delete_review(&self, title: TitleId, id: ReviewId) -> Result<(), ReviewError>;

    /// Lists a review's comments, newest first.
    async fn list_comments(
        &self,
        title: TitleId,
        review: ReviewId,
    ) -> Result<Vec<CommentDto>, ReviewError>;

    async fn get_comment(
        &self,
        title: TitleId,
        review: ReviewId,
        id: CommentId,
    ) -> Result<CommentDto, ReviewError>;

    async fn create_comment(
        &self,
        title: TitleId,
        review: ReviewId,
        author: &User,
        request: CommentRequest,
    ) -> Result<CommentDto, ReviewError>;

    async fn update_comment(
        &self,
        title: TitleId,
        review: ReviewId,
        id: CommentId,
        request: CommentRequest,
    ) -> Result<CommentDto, ReviewError>;

    async fn delete_comment(
        &self,
        title: TitleId,
        review: ReviewId,
        id: CommentId,
    ) -> Result<(), ReviewError>;
}
