use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// One review per author per title.
pub const REVIEW_AUTHOR_INDEX: &str = "idx-reviews-title_id-author_id";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name(REVIEW_AUTHOR_INDEX)
                    .table(Reviews::Table)
                    .col(Reviews::TitleId)
                    .col(Reviews::AuthorId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(REVIEW_AUTHOR_INDEX)
                    .table(Reviews::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    TitleId,
    AuthorId,
}
