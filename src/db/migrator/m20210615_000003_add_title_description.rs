use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_column("titles", "description").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Titles::Table)
                        .add_column(ColumnDef::new(Titles::Description).text().null())
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Titles::Table)
                    .drop_column(Titles::Description)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Titles {
    Table,
    Description,
}
