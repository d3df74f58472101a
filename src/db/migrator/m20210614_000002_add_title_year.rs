use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const YEAR_INDEX: &str = "idx-titles-year";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_column("titles", "year").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Titles::Table)
                        .add_column(ColumnDef::new(Titles::Year).small_integer().null())
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .name(YEAR_INDEX)
                    .table(Titles::Table)
                    .col(Titles::Year)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name(YEAR_INDEX).table(Titles::Table).to_owned())
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Titles::Table)
                    .drop_column(Titles::Year)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Titles {
    Table,
    Year,
}
