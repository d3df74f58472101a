use crate::models::review::{Comment, Review};
use crate::models::taxonomy::{Category, Genre};
use crate::models::title::{NewTitle, Title, TitleChanges};
use crate::models::user::User;
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement};
use sea_orm_migration::{MigrationStatus, MigratorTrait};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use migrator::DEFAULT_API_KEY;
pub use repositories::title::TitleFilter;

/// True when `err` wraps a unique-constraint violation reported by the database.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<DbErr>())
        .any(|db_err| matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))))
}

/// True when `err` wraps a foreign-key violation, such as a title write racing
/// the deletion of the category or genre it references.
#[must_use]
pub fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<DbErr>())
        .any(|db_err| {
            matches!(
                db_err.sql_err(),
                Some(SqlErr::ForeignKeyConstraintViolation(_))
            )
        })
}

/// One row of `yamdb migrate status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationState {
    pub name: String,
    pub applied: bool,
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        let store = Self::connect(db_url, max_connections, min_connections).await?;

        migrator::Migrator::up(&store.conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(store)
    }

    /// Opens the pool without touching the schema. Used by `yamdb migrate`.
    pub async fn connect(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        if !db_url.starts_with(":memory:") && !db_url.contains("mode=memory") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    // ========================================================================
    // Migrations
    // ========================================================================

    pub async fn migrate_up(&self) -> Result<()> {
        migrator::Migrator::up(&self.conn, None).await?;
        Ok(())
    }

    /// Reverts the last `steps` applied migrations.
    pub async fn migrate_down(&self, steps: u32) -> Result<()> {
        migrator::Migrator::down(&self.conn, Some(steps)).await?;
        Ok(())
    }

    pub async fn migration_status(&self) -> Result<Vec<MigrationState>> {
        let migrations = migrator::Migrator::get_migration_with_status(&self.conn).await?;
        Ok(migrations
            .iter()
            .map(|m| MigrationState {
                name: m.name().to_string(),
                applied: matches!(m.status(), MigrationStatus::Applied),
            })
            .collect())
    }

    // ========================================================================
    // Repositories
    // ========================================================================

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn category_repo(&self) -> repositories::category::CategoryRepository {
        repositories::category::CategoryRepository::new(self.conn.clone())
    }

    fn genre_repo(&self) -> repositories::genre::GenreRepository {
        repositories::genre::GenreRepository::new(self.conn.clone())
    }

    fn title_repo(&self) -> repositories::title::TitleRepository {
        repositories::title::TitleRepository::new(self.conn.clone())
    }

    fn review_repo(&self) -> repositories::review::ReviewRepository {
        repositories::review::ReviewRepository::new(self.conn.clone())
    }

    fn comment_repo(&self) -> repositories::comment::CommentRepository {
        repositories::comment::CommentRepository::new(self.conn.clone())
    }

    // Users

    pub async fn create_user(&self, username: &str) -> Result<User> {
        self.user_repo().create(username).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn regenerate_api_key(&self, username: &str) -> Result<String> {
        self.user_repo().regenerate_api_key(username).await
    }

    // Categories

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.category_repo().list().await
    }

    pub async fn get_category(&self, id: i32) -> Result<Option<Category>> {
        self.category_repo().get(id).await
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        self.category_repo().get_by_slug(slug).await
    }

    pub async fn create_category(&self, name: &str, slug: &str) -> Result<Category> {
        self.category_repo().create(name, slug).await
    }

    pub async fn remove_category(&self, slug: &str) -> Result<bool> {
        self.category_repo().remove_by_slug(slug).await
    }

    // Genres

    pub async fn list_genres(&self) -> Result<Vec<Genre>> {
        self.genre_repo().list().await
    }

    pub async fn get_genre_by_slug(&self, slug: &str) -> Result<Option<Genre>> {
        self.genre_repo().get_by_slug(slug).await
    }

    pub async fn missing_genre_ids(&self, ids: &[i32]) -> Result<Vec<i32>> {
        self.genre_repo().missing_ids(ids).await
    }

    pub async fn create_genre(&self, name: &str, slug: &str) -> Result<Genre> {
        self.genre_repo().create(name, slug).await
    }

    pub async fn remove_genre(&self, slug: &str) -> Result<bool> {
        self.genre_repo().remove_by_slug(slug).await
    }

    // Titles

    pub async fn get_title(&self, id: i32) -> Result<Option<Title>> {
        self.title_repo().get(id).await
    }

    pub async fn title_exists(&self, id: i32) -> Result<bool> {
        self.title_repo().exists(id).await
    }

    pub async fn list_titles(&self, filter: &TitleFilter) -> Result<Vec<Title>> {
        self.title_repo().list(filter).await
    }

    pub async fn create_title(&self, title: NewTitle) -> Result<i32> {
        self.title_repo().create(title).await
    }

    pub async fn update_title(&self, id: i32, changes: TitleChanges) -> Result<bool> {
        self.title_repo().update(id, changes).await
    }

    pub async fn remove_title(&self, id: i32) -> Result<bool> {
        self.title_repo().remove(id).await
    }

    // Reviews

    pub async fn get_review(&self, id: i32) -> Result<Option<Review>> {
        self.review_repo().get(id).await
    }

    pub async fn list_reviews(&self, title_id: i32) -> Result<Vec<Review>> {
        self.review_repo().list_for_title(title_id).await
    }

    pub async fn find_review_by_author(&self, title_id: i32, author_id: i32) -> Result<Option<i32>> {
        self.review_repo().find_by_author(title_id, author_id).await
    }

    pub async fn review_count(&self, title_id: i32) -> Result<u64> {
        self.review_repo().count_for_title(title_id).await
    }

    pub async fn get_rating(&self, title_id: i32) -> Result<Option<f64>> {
        self.review_repo().rating(title_id).await
    }

    pub async fn get_ratings(&self, title_ids: &[i32]) -> Result<HashMap<i32, f64>> {
        self.review_repo().ratings(title_ids).await
    }

    pub async fn create_review(
        &self,
        title_id: i32,
        author_id: i32,
        text: &str,
        score: i16,
    ) -> Result<i32> {
        self.review_repo()
            .create(title_id, author_id, text, score)
            .await
    }

    pub async fn update_review(
        &self,
        id: i32,
        text: Option<String>,
        score: Option<i16>,
    ) -> Result<bool> {
        self.review_repo().update(id, text, score).await
    }

    pub async fn remove_review(&self, id: i32) -> Result<bool> {
        self.review_repo().remove(id).await
    }

    // Comments

    pub async fn get_comment(&self, id: i32) -> Result<Option<Comment>> {
        self.comment_repo().get(id).await
    }

    pub async fn list_comments(&self, review_id: i32) -> Result<Vec<Comment>> {
        self.comment_repo().list_for_review(review_id).await
    }

    pub async fn create_comment(&self, review_id: i32, author_id: i32, text: &str) -> Result<i32> {
        self.comment_repo().create(review_id, author_id, text).await
    }

    pub async fn update_comment(&self, id: i32, text: &str) -> Result<bool> {
        self.comment_repo().update_text(id, text).await
    }

    pub async fn remove_comment(&self, id: i32) -> Result<bool> {
        self.comment_repo().remove(id).await
    }
}
