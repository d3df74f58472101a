use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::entities::{comments, prelude::*, users};
use crate::models::review::Comment;

/// Repository for comments attached to reviews
pub struct CommentRepository {
    conn: DatabaseConnection,
}

impl CommentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_comment_model(comment: comments::Model, author: Option<users::Model>) -> Comment {
        Comment {
            id: comment.id,
            review_id: comment.review_id,
            text: comment.text,
            author_id: comment.author_id,
            author: author.map(|u| u.username).unwrap_or_default(),
            pub_date: comment.pub_date,
        }
    }

    pub async fn get(&self, id: i32) -> Result<Option<Comment>> {
        let row = Comments::find_by_id(id)
            .find_also_related(Users)
            .one(&self.conn)
            .await
            .context("Failed to query comment by ID")?;

        Ok(row.map(|(c, u)| Self::map_comment_model(c, u)))
    }

    /// Newest first by publication date.
    pub async fn list_for_review(&self, review_id: i32) -> Result<Vec<Comment>> {
        let rows = Comments::find()
            .filter(comments::Column::ReviewId.eq(review_id))
            .find_also_related(Users)
            .order_by_desc(comments::Column::PubDate)
            .order_by_desc(comments::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list comments")?;

        Ok(rows
            .into_iter()
            .map(|(c, u)| Self::map_comment_model(c, u))
            .collect())
    }

    pub async fn create(&self, review_id: i32, author_id: i32, text: &str) -> Result<i32> {
        let result = Comments::insert(comments::ActiveModel {
            review_id: Set(review_id),
            author_id: Set(author_id),
            text: Set(text.to_string()),
            pub_date: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        })
        .exec(&self.conn)
        .await?;

        info!(
            "Added comment {} on review {} by user {}",
            result.last_insert_id, review_id, author_id
        );
        Ok(result.last_insert_id)
    }

    pub async fn update_text(&self, id: i32, text: &str) -> Result<bool> {
        let Some(model) = Comments::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        let mut active: comments::ActiveModel = model.into();
        active.text = Set(text.to_string());
        active.update(&self.conn).await?;
        Ok(true)
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = Comments::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
