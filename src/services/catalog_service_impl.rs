//! `SeaORM` implementation of the `CatalogService` trait.

use crate::api::types::{CategoryDto, GenreDto, TaxonomyRequest, TitleDto, TitlePatch, TitleRequest};
use crate::db::{Store, TitleFilter, is_foreign_key_violation, is_unique_violation};
use crate::domain::TitleId;
use crate::domain::display::{DEFAULT_WRAP_WIDTH, render_title};
use crate::models::title::{NewTitle, Title, TitleChanges};
use crate::services::catalog_service::{CatalogError, CatalogService};
use tracing::{debug, info};
use validator::Validate;

/// SeaORM-based implementation of [`CatalogService`].
pub struct SeaOrmCatalogService {
    store: Store,
}

/// Validated, typed form of a [`TitleRequest`].
struct TitleFields {
    name: String,
    year: Option<i16>,
    description: Option<String>,
    category_id: Option<i32>,
    genre_ids: Vec<i32>,
}

impl TitleFields {
    fn from_request(request: TitleRequest) -> Result<Self, CatalogError> {
        if let Err(errors) = request.validate() {
            debug!("Rejected title payload: {errors}");
            return Err(errors.into());
        }

        let year = request
            .year
            .map(i16::try_from)
            .transpose()
            .map_err(|_| CatalogError::invalid_field("year", "Year is out of range"))?;

        Ok(Self {
            name: request.name.unwrap_or_default(),
            year,
            description: request.description,
            category_id: request.category,
            genre_ids: request.genre,
        })
    }
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn to_dto(&self, title: Title) -> Result<TitleDto, CatalogError> {
        let rating = self.store.get_rating(title.id).await?;
        Ok(TitleDto::from_title(title, rating))
    }

    async fn load_title(&self, id: TitleId) -> Result<Title, CatalogError> {
        self.store
            .get_title(id.value())
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Title {id}")))
    }

    /// Category and genres referenced by a title write must exist.
    async fn check_references(
        &self,
        category_id: Option<i32>,
        genre_ids: &[i32],
    ) -> Result<(), CatalogError> {
        if let Some(category_id) = category_id
            && self.store.get_category(category_id).await?.is_none()
        {
            return Err(CatalogError::NotFound(format!("Category {category_id}")));
        }

        let missing = self.store.missing_genre_ids(genre_ids).await?;
        if !missing.is_empty() {
            let ids: Vec<String> = missing.iter().map(ToString::to_string).collect();
            return Err(CatalogError::NotFound(format!("Genre {}", ids.join(", "))));
        }

        Ok(())
    }

    /// Maps a write that lost a race with a category or genre deletion.
    async fn missing_reference(
        &self,
        err: anyhow::Error,
        category_id: Option<i32>,
        genre_ids: &[i32],
    ) -> CatalogError {
        if !is_foreign_key_violation(&err) {
            return err.into();
        }
        match self.check_references(category_id, genre_ids).await {
            Err(missing) => missing,
            Ok(()) => CatalogError::NotFound("Referenced category or genre".to_string()),
        }
    }

    fn validate_taxonomy(request: TaxonomyRequest) -> Result<(String, String), CatalogError> {
        if let Err(errors) = request.validate() {
            debug!("Rejected taxonomy payload: {errors}");
            return Err(errors.into());
        }
        Ok((
            request.name.unwrap_or_default(),
            request.slug.unwrap_or_default(),
        ))
    }

    fn slug_conflict(kind: &str, slug: &str) -> CatalogError {
        CatalogError::Conflict(format!("{kind} with slug '{slug}' already exists"))
    }
}

#[async_trait::async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn list_categories(&self) -> Result<Vec<CategoryDto>, CatalogError> {
        let categories = self.store.list_categories().await?;
        Ok(categories.into_iter().map(CategoryDto::from).collect())
    }

    async fn create_category(&self, request: TaxonomyRequest) -> Result<CategoryDto, CatalogError> {
        let (name, slug) = Self::validate_taxonomy(request)?;

        if self.store.get_category_by_slug(&slug).await?.is_some() {
            return Err(Self::slug_conflict("Category", &slug));
        }

        match self.store.create_category(&name, &slug).await {
            Ok(category) => Ok(category.into()),
            Err(e) if is_unique_violation(&e) => Err(Self::slug_conflict("Category", &slug)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_category(&self, slug: &str) -> Result<(), CatalogError> {
        if self.store.remove_category(slug).await? {
            Ok(())
        } else {
            Err(CatalogError::NotFound(format!("Category '{slug}'")))
        }
    }

    async fn list_genres(&self) -> Result<Vec<GenreDto>, CatalogError> {
        let genres = self.store.list_genres().await?;
        Ok(genres.into_iter().map(GenreDto::from).collect())
    }

    async fn create_genre(&self, request: TaxonomyRequest) -> Result<GenreDto, CatalogError> {
        let (name, slug) = Self::validate_taxonomy(request)?;

        if self.store.get_genre_by_slug(&slug).await?.is_some() {
            return Err(Self::slug_conflict("Genre", &slug));
        }

        match self.store.create_genre(&name, &slug).await {
            Ok(genre) => Ok(genre.into()),
            Err(e) if is_unique_violation(&e) => Err(Self::slug_conflict("Genre", &slug)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_genre(&self, slug: &str) -> Result<(), CatalogError> {
        if self.store.remove_genre(slug).await? {
            Ok(())
        } else {
            Err(CatalogError::NotFound(format!("Genre '{slug}'")))
        }
    }

    async fn list_titles(&self, filter: TitleFilter) -> Result<Vec<TitleDto>, CatalogError> {
        let titles = self.store.list_titles(&filter).await?;
        let ids: Vec<i32> = titles.iter().map(|t| t.id).collect();
        let ratings = self.store.get_ratings(&ids).await?;

        Ok(titles
            .into_iter()
            .map(|title| {
                let rating = ratings.get(&title.id).copied();
                TitleDto::from_title(title, rating)
            })
            .collect())
    }

    async fn get_title(&self, id: TitleId) -> Result<TitleDto, CatalogError> {
        let title = self.load_title(id).await?;
        self.to_dto(title).await
    }

    async fn create_title(&self, request: TitleRequest) -> Result<TitleDto, CatalogError> {
        let fields = TitleFields::from_request(request)?;
        self.check_references(fields.category_id, &fields.genre_ids)
            .await?;

        let category_id = fields.category_id;
        let genre_ids = fields.genre_ids.clone();
        let id = match self
            .store
            .create_title(NewTitle {
                name: fields.name,
                year: fields.year,
                description: fields.description,
                category_id: fields.category_id,
                genre_ids: fields.genre_ids,
            })
            .await
        {
            Ok(id) => id,
            Err(e) => return Err(self.missing_reference(e, category_id, &genre_ids).await),
        };

        let title = self.load_title(TitleId::new(id)).await?;
        info!(title_id = id, "Title created");
        debug!("{}", render_title(&title, DEFAULT_WRAP_WIDTH));
        self.to_dto(title).await
    }

    async fn update_title(&self, id: TitleId, patch: TitlePatch) -> Result<TitleDto, CatalogError> {
        let current = self.load_title(id).await?;
        let genres_changed = patch.genre.is_some();

        let fields = TitleFields::from_request(patch.merge_into(&current))?;
        self.check_references(fields.category_id, &fields.genre_ids)
            .await?;

        let category_id = fields.category_id;
        let genre_ids = fields.genre_ids.clone();
        let changes = TitleChanges {
            name: Some(fields.name),
            year: Some(fields.year),
            description: Some(fields.description),
            category_id: Some(fields.category_id),
            genre_ids: genres_changed.then_some(fields.genre_ids),
        };

        match self.store.update_title(id.value(), changes).await {
            Ok(true) => {}
            Ok(false) => return Err(CatalogError::NotFound(format!("Title {id}"))),
            Err(e) => return Err(self.missing_reference(e, category_id, &genre_ids).await),
        }

        let title = self.load_title(id).await?;
        info!(title_id = id.value(), "Title updated");
        debug!("{}", render_title(&title, DEFAULT_WRAP_WIDTH));
        self.to_dto(title).await
    }

    async fn delete_title(&self, id: TitleId) -> Result<(), CatalogError> {
        if self.store.remove_title(id.value()).await? {
            Ok(())
        } else {
            Err(CatalogError::NotFound(format!("Title {id}")))
        }
    }
}
