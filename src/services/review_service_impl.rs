//! `SeaORM` implementation of the `ReviewService` trait.

use crate::api::types::{CommentDto, CommentRequest, ReviewDto, ReviewPatch, ReviewRequest};
use crate::db::{Store, is_unique_violation};
use crate::domain::rules::FieldError;
use crate::domain::{CommentId, ReviewId, Score, TitleId};
use crate::models::review::{Comment, Review};
use crate::models::user::User;
use crate::services::review_service::{ReviewError, ReviewService};
use tracing::{debug, info, warn};
use validator::Validate;

/// SeaORM-based implementation of [`ReviewService`].
pub struct SeaOrmReviewService {
    store: Store,
}

fn score_from(value: i32) -> Result<Score, ReviewError> {
    Score::try_from(value)
        .map_err(|e| ReviewError::Validation(vec![FieldError::new("score", e.to_string())]))
}

fn validated<T: Validate>(payload: T) -> Result<T, ReviewError> {
    if let Err(errors) = payload.validate() {
        debug!("Rejected review payload: {errors}");
        return Err(errors.into());
    }
    Ok(payload)
}

impl SeaOrmReviewService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_title(&self, title: TitleId) -> Result<(), ReviewError> {
        if self.store.title_exists(title.value()).await? {
            Ok(())
        } else {
            Err(ReviewError::TitleNotFound(title))
        }
    }

    /// Loads a review, insisting that it belongs to `title`.
    async fn load_review(&self, title: TitleId, id: ReviewId) -> Result<Review, ReviewError> {
        self.ensure_title(title).await?;
        self.store
            .get_review(id.value())
            .await?
            .filter(|r| r.title_id == title.value())
            .ok_or(ReviewError::ReviewNotFound(id))
    }

    /// Loads a comment, insisting that it belongs to `review` under `title`.
    async fn load_comment(
        &self,
        title: TitleId,
        review: ReviewId,
        id: CommentId,
    ) -> Result<Comment, ReviewError> {
        self.load_review(title, review).await?;
        self.store
            .get_comment(id.value())
            .await?
            .filter(|c| c.review_id == review.value())
            .ok_or(ReviewError::CommentNotFound(id))
    }
}

#[async_trait::async_trait]
impl ReviewService for SeaOrmReviewService {
    async fn list_reviews(&self, title: TitleId) -> Result<Vec<ReviewDto>, ReviewError> {
        self.ensure_title(title).await?;
        let reviews = self.store.list_reviews(title.value()).await?;
        Ok(reviews.into_iter().map(ReviewDto::from).collect())
    }

    async fn get_review(&self, title: TitleId, id: ReviewId) -> Result<ReviewDto, ReviewError> {
        Ok(self.load_review(title, id).await?.into())
    }

    async fn create_review(
        &self,
        title: TitleId,
        author: &User,
        request: ReviewRequest,
    ) -> Result<ReviewDto, ReviewError> {
        let request = validated(request)?;
        let score = request.score.map(score_from).transpose()?.unwrap_or_default();
        self.ensure_title(title).await?;

        let already_reviewed = || ReviewError::AlreadyReviewed {
            title,
            author: author.username.clone(),
        };

        if self
            .store
            .find_review_by_author(title.value(), author.id)
            .await?
            .is_some()
        {
            warn!(title_id = %title, user = %author.username, "Duplicate review rejected");
            return Err(already_reviewed());
        }

        let text = request.text.unwrap_or_default();
        let id = match self
            .store
            .create_review(title.value(), author.id, &text, score.into())
            .await
        {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => {
                warn!(title_id = %title, user = %author.username, "Concurrent duplicate review rejected");
                return Err(already_reviewed());
            }
            Err(e) => return Err(e.into()),
        };

        metrics::counter!("reviews_created_total").increment(1);
        info!(review_id = id, title_id = %title, score = %score, "Review created");

        self.load_review(title, ReviewId::new(id)).await.map(Into::into)
    }

    async fn update_review(
        &self,
        title: TitleId,
        id: ReviewId,
        patch: ReviewPatch,
    ) -> Result<ReviewDto, ReviewError> {
        let patch = validated(patch)?;
        let score = patch.score.map(score_from).transpose()?;
        self.load_review(title, id).await?;

        self.store
            .update_review(id.value(), patch.text, score.map(i16::from))
            .await?;

        self.load_review(title, id).await.map(Into::into)
    }

    async fn delete_review(&self, title: TitleId, id: ReviewId) -> Result<(), ReviewError> {
        self.load_review(title, id).await?;
        self.store.remove_review(id.value()).await?;
        Ok(())
    }

    async fn list_comments(
        &self,
        title: TitleId,
        review: ReviewId,
    ) -> Result<Vec<CommentDto>, ReviewError> {
        self.load_review(title, review).await?;
        let comments = self.store.list_comments(review.value()).await?;
        Ok(comments.into_iter().map(CommentDto::from).collect())
    }

    async fn get_comment(
        &self,
        title: TitleId,
        review: ReviewId,
        id: CommentId,
    ) -> Result<CommentDto, ReviewError> {
        Ok(self.load_comment(title, review, id).await?.into())
    }

    async fn create_comment(
        &self,
        title: TitleId,
        review: ReviewId,
        author: &User,
        request: CommentRequest,
    ) -> Result<CommentDto, ReviewError> {
        let request = validated(request)?;
        self.load_review(title, review).await?;

        let text = request.text.unwrap_or_default();
        let id = self
            .store
            .create_comment(review.value(), author.id, &text)
            .await?;

        self.load_comment(title, review, CommentId::new(id))
            .await
            .map(Into::into)
    }

    async fn update_comment(
        &self,
        title: TitleId,
        review: ReviewId,
        id: CommentId,
        request: CommentRequest,
    ) -> Result<CommentDto, ReviewError> {
        let request = validated(request)?;
        self.load_comment(title, review, id).await?;

        let text = request.text.unwrap_or_default();
        self.store.update_comment(id.value(), &text).await?;

        self.load_comment(title, review, id).await.map(Into::into)
    }

    async fn delete_comment(
        &self,
        title: TitleId,
        review: ReviewId,
        id: CommentId,
    ) -> Result<(), ReviewError> {
        self.load_comment(title, review, id).await?;
        self.store.remove_comment(id.value()).await?;
        Ok(())
    }
}
