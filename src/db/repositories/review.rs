use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use crate::entities::{comments, prelude::*, reviews, titles, users};
use crate::models::review::Review;

/// Repository for reviews and the rating aggregate
pub struct ReviewRepository {
    conn: DatabaseConnection,
}

impl ReviewRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Model Conversion Helpers
    // ========================================================================

    fn map_review_model(
        review: reviews::Model,
        author: Option<&users::Model>,
        title: Option<&titles::Model>,
    ) -> Review {
        Review {
            id: review.id,
            title_id: review.title_id,
            title_name: title.map(|t| t.name.clone()).unwrap_or_default(),
            text: review.text,
            author_id: review.author_id,
            author: author.map(|u| u.username.clone()).unwrap_or_default(),
            score: review.score,
            pub_date: review.pub_date,
        }
    }

    async fn hydrate(&self, rows: Vec<(reviews::Model, Option<users::Model>)>) -> Result<Vec<Review>> {
        let mut title_ids: Vec<i32> = rows.iter().map(|(r, _)| r.title_id).collect();
        title_ids.sort_unstable();
        title_ids.dedup();

        let titles: HashMap<i32, titles::Model> = if title_ids.is_empty() {
            HashMap::new()
        } else {
            Titles::find()
                .filter(titles::Column::Id.is_in(title_ids))
                .all(&self.conn)
                .await?
                .into_iter()
                .map(|t| (t.id, t))
                .collect()
        };

        Ok(rows
            .into_iter()
            .map(|(review, author)| {
                let title = titles.get(&review.title_id);
                Self::map_review_model(review, author.as_ref(), title)
            })
            .collect())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn get(&self, id: i32) -> Result<Option<Review>> {
        let row = Reviews::find_by_id(id)
            .find_also_related(Users)
            .one(&self.conn)
            .await
            .context("Failed to query review by ID")?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![row]).await?.pop())
    }

    /// Newest first.
    pub async fn list_for_title(&self, title_id: i32) -> Result<Vec<Review>> {
        let rows = Reviews::find()
            .filter(reviews::Column::TitleId.eq(title_id))
            .find_also_related(Users)
            .order_by_desc(reviews::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list reviews")?;

        self.hydrate(rows).await
    }

    pub async fn find_by_author(&self, title_id: i32, author_id: i32) -> Result<Option<i32>> {
        let id = Reviews::find()
            .select_only()
            .column(reviews::Column::Id)
            .filter(reviews::Column::TitleId.eq(title_id))
            .filter(reviews::Column::AuthorId.eq(author_id))
            .into_tuple::<i32>()
            .one(&self.conn)
            .await?;
        Ok(id)
    }

    pub async fn count_for_title(&self, title_id: i32) -> Result<u64> {
        let count = Reviews::find()
            .filter(reviews::Column::TitleId.eq(title_id))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    /// Mean score of a title's reviews, `None` when it has none.
    pub async fn rating(&self, title_id: i32) -> Result<Option<f64>> {
        let rating: Option<Option<f64>> = Reviews::find()
            .select_only()
            .column_as(SimpleExpr::from(Func::avg(Expr::col(reviews::Column::Score))), "rating")
            .filter(reviews::Column::TitleId.eq(title_id))
            .into_tuple()
            .one(&self.conn)
            .await
            .context("Failed to aggregate rating")?;

        Ok(rating.flatten())
    }

    /// Ratings for a batch of titles; titles without reviews are absent from the map.
    pub async fn ratings(&self, title_ids: &[i32]) -> Result<HashMap<i32, f64>> {
        if title_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let results: Vec<(i32, Option<f64>)> = Reviews::find()
            .select_only()
            .column(reviews::Column::TitleId)
            .column_as(SimpleExpr::from(Func::avg(Expr::col(reviews::Column::Score))), "rating")
            .filter(reviews::Column::TitleId.is_in(title_ids.to_vec()))
            .group_by(reviews::Column::TitleId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to aggregate ratings")?;

        Ok(results
            .into_iter()
            .filter_map(|(id, rating)| rating.map(|r| (id, r)))
            .collect())
    }

    // ========================================================================
    // Writes
    // ========================================================================

    pub async fn create(&self, title_id: i32, author_id: i32, text: &str, score: i16) -> Result<i32> {
        let result = Reviews::insert(reviews::ActiveModel {
            title_id: Set(title_id),
            author_id: Set(author_id),
            text: Set(text.to_string()),
            score: Set(score),
            pub_date: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        })
        .exec(&self.conn)
        .await?;

        info!(
            "Added review {} for title {} by user {}",
            result.last_insert_id, title_id, author_id
        );
        Ok(result.last_insert_id)
    }

    pub async fn update(&self, id: i32, text: Option<String>, score: Option<i16>) -> Result<bool> {
        let Some(model) = Reviews::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        let mut active: reviews::ActiveModel = model.into();
        if let Some(text) = text {
            active.text = Set(text);
        }
        if let Some(score) = score {
            active.score = Set(score);
        }
        if active.is_changed() {
            active.update(&self.conn).await?;
        }
        Ok(true)
    }

    /// Deletes the review and its comments.
    pub async fn remove(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        Comments::delete_many()
            .filter(comments::Column::ReviewId.eq(id))
            .exec(&txn)
            .await?;

        let result = Reviews::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Removed review with ID: {}", id);
        }
        Ok(removed)
    }
}
