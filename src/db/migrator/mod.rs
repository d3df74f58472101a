use sea_orm_migration::prelude::*;

mod m20210601_000001_initial;
mod m20210614_000002_add_title_year;
mod m20210615_000003_add_title_description;
mod m20210616_000004_unique_review_author;

pub use m20210601_000001_initial::DEFAULT_API_KEY;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20210601_000001_initial::Migration),
            Box::new(m20210614_000002_add_title_year::Migration),
            Box::new(m20210615_000003_add_title_description::Migration),
            Box::new(m20210616_000004_unique_review_author::Migration),
        ]
    }
}
