use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};
use tracing::info;

use crate::entities::{
    categories, comments, genre_titles, genres, prelude::*, reviews, titles,
};
use crate::models::taxonomy::{Category, Genre};
use crate::models::title::{NewTitle, Title, TitleChanges};

/// Filters accepted by title listings. Unknown slugs match nothing.
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    pub category: Option<String>,
    pub genre: Option<String>,
    pub name: Option<String>,
    pub year: Option<i16>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Repository for titles and their genre links
pub struct TitleRepository {
    conn: DatabaseConnection,
}

impl TitleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn get(&self, id: i32) -> Result<Option<Title>> {
        let Some(model) = Titles::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query title by ID")?
        else {
            return Ok(None);
        };

        let mut hydrated = self.hydrate(vec![model]).await?;
        Ok(hydrated.pop())
    }

    pub async fn exists(&self, id: i32) -> Result<bool> {
        let found = Titles::find_by_id(id)
            .select_only()
            .column(titles::Column::Id)
            .into_tuple::<i32>()
            .one(&self.conn)
            .await?;
        Ok(found.is_some())
    }

    /// Newest first, like every catalog listing.
    pub async fn list(&self, filter: &TitleFilter) -> Result<Vec<Title>> {
        let mut query = Titles::find().order_by_desc(titles::Column::Id);

        if let Some(slug) = &filter.category {
            let Some(category) = Categories::find()
                .filter(categories::Column::Slug.eq(slug.as_str()))
                .one(&self.conn)
                .await?
            else {
                return Ok(Vec::new());
            };
            query = query.filter(titles::Column::CategoryId.eq(category.id));
        }

        if let Some(slug) = &filter.genre {
            let Some(genre) = Genres::find()
                .filter(genres::Column::Slug.eq(slug.as_str()))
                .one(&self.conn)
                .await?
            else {
                return Ok(Vec::new());
            };
            query = query.filter(
                titles::Column::Id.in_subquery(
                    GenreTitles::find()
                        .select_only()
                        .column(genre_titles::Column::TitleId)
                        .filter(genre_titles::Column::GenreId.eq(genre.id))
                        .into_query(),
                ),
            );
        }

        if let Some(name) = &filter.name {
            query = query.filter(titles::Column::Name.contains(name.as_str()));
        }

        if let Some(year) = filter.year {
            query = query.filter(titles::Column::Year.eq(year));
        }

        let models = query
            .offset(filter.offset)
            .limit(filter.limit)
            .all(&self.conn)
            .await
            .context("Failed to list titles")?;

        self.hydrate(models).await
    }

    /// Resolves categories and genres for a batch of title rows with one query each.
    async fn hydrate(&self, models: Vec<titles::Model>) -> Result<Vec<Title>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let title_ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let category_ids: Vec<i32> = models.iter().filter_map(|m| m.category_id).collect();

        let categories: HashMap<i32, Category> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            Categories::find()
                .filter(categories::Column::Id.is_in(category_ids))
                .all(&self.conn)
                .await?
                .into_iter()
                .map(|c| (c.id, Category::from(c)))
                .collect()
        };

        let links = GenreTitles::find()
            .filter(genre_titles::Column::TitleId.is_in(title_ids))
            .find_also_related(Genres)
            .order_by_asc(genre_titles::Column::GenreId)
            .all(&self.conn)
            .await?;

        let mut genres_by_title: HashMap<i32, Vec<Genre>> = HashMap::new();
        for (link, genre) in links {
            if let Some(genre) = genre {
                genres_by_title
                    .entry(link.title_id)
                    .or_default()
                    .push(Genre::from(genre));
            }
        }

        Ok(models
            .into_iter()
            .map(|m| Title {
                id: m.id,
                category: m.category_id.and_then(|id| categories.get(&id).cloned()),
                genres: genres_by_title.remove(&m.id).unwrap_or_default(),
                name: m.name,
                year: m.year,
                description: m.description,
            })
            .collect())
    }

    // ========================================================================
    // Writes
    // ========================================================================

    pub async fn create(&self, title: NewTitle) -> Result<i32> {
        let txn = self.conn.begin().await?;

        let result = Titles::insert(titles::ActiveModel {
            name: Set(title.name.clone()),
            year: Set(title.year),
            description: Set(title.description),
            category_id: Set(title.category_id),
            ..Default::default()
        })
        .exec(&txn)
        .await?;

        let title_id = result.last_insert_id;
        Self::replace_genres(&txn, title_id, &title.genre_ids).await?;

        txn.commit().await?;
        info!("Created title {}: {}", title_id, title.name);
        Ok(title_id)
    }

    /// Returns `false` when the title does not exist.
    pub async fn update(&self, id: i32, changes: TitleChanges) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let Some(model) = Titles::find_by_id(id).one(&txn).await? else {
            return Ok(false);
        };

        let mut active: titles::ActiveModel = model.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(year) = changes.year {
            active.year = Set(year);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(category_id) = changes.category_id {
            active.category_id = Set(category_id);
        }
        if active.is_changed() {
            active.update(&txn).await?;
        }

        if let Some(genre_ids) = changes.genre_ids {
            Self::replace_genres(&txn, id, &genre_ids).await?;
        }

        txn.commit().await?;
        info!("Updated title {}", id);
        Ok(true)
    }

    async fn replace_genres(txn: &DatabaseTransaction, title_id: i32, genre_ids: &[i32]) -> Result<()> {
        GenreTitles::delete_many()
            .filter(genre_titles::Column::TitleId.eq(title_id))
            .exec(txn)
            .await?;

        let mut unique = genre_ids.to_vec();
        unique.sort_unstable();
        unique.dedup();

        if !unique.is_empty() {
            let links: Vec<genre_titles::ActiveModel> = unique
                .into_iter()
                .map(|genre_id| genre_titles::ActiveModel {
                    genre_id: Set(genre_id),
                    title_id: Set(title_id),
                })
                .collect();

            GenreTitles::insert_many(links).exec(txn).await?;
        }

        Ok(())
    }

    /// Deletes the title with its genre links, reviews and their comments.
    pub async fn remove(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let review_ids = Reviews::find()
            .select_only()
            .column(reviews::Column::Id)
            .filter(reviews::Column::TitleId.eq(id))
            .into_query();

        Comments::delete_many()
            .filter(comments::Column::ReviewId.in_subquery(review_ids))
            .exec(&txn)
            .await?;

        Reviews::delete_many()
            .filter(reviews::Column::TitleId.eq(id))
            .exec(&txn)
            .await?;

        GenreTitles::delete_many()
            .filter(genre_titles::Column::TitleId.eq(id))
            .exec(&txn)
            .await?;

        let result = Titles::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Removed title with ID: {}", id);
        }
        Ok(removed)
    }
}
