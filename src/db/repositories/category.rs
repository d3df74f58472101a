use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::entities::{categories, prelude::*, titles};
use crate::models::taxonomy::Category;

/// Repository for title categories
pub struct CategoryRepository {
    conn: DatabaseConnection,
}

impl CategoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Newest first.
    pub async fn list(&self) -> Result<Vec<Category>> {
        let rows = Categories::find()
            .order_by_desc(categories::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list categories")?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<Category>> {
        let row = Categories::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(Category::from))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row = Categories::find()
            .filter(categories::Column::Slug.eq(slug))
            .one(&self.conn)
            .await
            .context("Failed to query category by slug")?;

        Ok(row.map(Category::from))
    }

    pub async fn create(&self, name: &str, slug: &str) -> Result<Category> {
        let result = Categories::insert(categories::ActiveModel {
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            ..Default::default()
        })
        .exec(&self.conn)
        .await?;

        info!("Added category {}: {}", slug, name);
        Ok(Category {
            id: result.last_insert_id,
            name: name.to_string(),
            slug: slug.to_string(),
        })
    }

    /// Titles in the category stay; their category reference is cleared.
    pub async fn remove_by_slug(&self, slug: &str) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let Some(category) = Categories::find()
            .filter(categories::Column::Slug.eq(slug))
            .one(&txn)
            .await?
        else {
            return Ok(false);
        };

        Titles::update_many()
            .col_expr(
                titles::Column::CategoryId,
                sea_orm::sea_query::Expr::value(Option::<i32>::None),
            )
            .filter(titles::Column::CategoryId.eq(category.id))
            .exec(&txn)
            .await?;

        Categories::delete_by_id(category.id).exec(&txn).await?;

        txn.commit().await?;
        info!("Removed category {}", slug);
        Ok(true)
    }
}
