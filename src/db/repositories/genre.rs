use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::info;

use crate::entities::{genre_titles, genres, prelude::*};
use crate::models::taxonomy::Genre;

/// Repository for genres
pub struct GenreRepository {
    conn: DatabaseConnection,
}

impl GenreRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Newest first.
    pub async fn list(&self) -> Result<Vec<Genre>> {
        let rows = Genres::find()
            .order_by_desc(genres::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list genres")?;

        Ok(rows.into_iter().map(Genre::from).collect())
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Genre>> {
        let row = Genres::find()
            .filter(genres::Column::Slug.eq(slug))
            .one(&self.conn)
            .await
            .context("Failed to query genre by slug")?;

        Ok(row.map(Genre::from))
    }

    /// Ids from `ids` that have no genre row.
    pub async fn missing_ids(&self, ids: &[i32]) -> Result<Vec<i32>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found: Vec<i32> = Genres::find()
            .select_only()
            .column(genres::Column::Id)
            .filter(genres::Column::Id.is_in(ids.to_vec()))
            .into_tuple()
            .all(&self.conn)
            .await?;

        let mut missing: Vec<i32> = ids.iter().copied().filter(|id| !found.contains(id)).collect();
        missing.sort_unstable();
        missing.dedup();
        Ok(missing)
    }

    pub async fn create(&self, name: &str, slug: &str) -> Result<Genre> {
        let result = Genres::insert(genres::ActiveModel {
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            ..Default::default()
        })
        .exec(&self.conn)
        .await?;

        info!("Added genre {}: {}", slug, name);
        Ok(Genre {
            id: result.last_insert_id,
            name: name.to_string(),
            slug: slug.to_string(),
        })
    }

    /// Deletes the genre and its title links; titles are untouched.
    pub async fn remove_by_slug(&self, slug: &str) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let Some(genre) = Genres::find()
            .filter(genres::Column::Slug.eq(slug))
            .one(&txn)
            .await?
        else {
            return Ok(false);
        };

        GenreTitles::delete_many()
            .filter(genre_titles::Column::GenreId.eq(genre.id))
            .exec(&txn)
            .await?;

        Genres::delete_by_id(genre.id).exec(&txn).await?;

        txn.commit().await?;
        info!("Removed genre {}", slug);
        Ok(true)
    }
}
