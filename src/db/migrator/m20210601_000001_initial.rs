use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// API key of the bootstrap `admin` user. Regenerate it before exposing the server.
pub const DEFAULT_API_KEY: &str = "yamdb_default_api_key_please_regenerate";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Categories)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        for mut index in schema.create_index_from_entity(Categories) {
            manager.create_index(index.if_not_exists().to_owned()).await?;
        }

        manager
            .create_table(
                schema
                    .create_table_from_entity(Genres)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // year and description arrive in later migrations
        manager
            .create_table(
                Table::create()
                    .table(TitlesTable::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TitlesTable::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TitlesTable::Name).string().not_null())
                    .col(ColumnDef::new(TitlesTable::CategoryId).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-titles-category_id")
                            .from(TitlesTable::Table, TitlesTable::CategoryId)
                            .to(CategoriesTable::Table, CategoriesTable::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(GenreTitles)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Reviews)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Comments)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        for mut index in schema.create_index_from_entity(Comments) {
            manager.create_index(index.if_not_exists().to_owned()).await?;
        }

        let now = chrono::Utc::now().to_rfc3339();
        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Users)
            .columns([
                crate::entities::users::Column::Username,
                crate::entities::users::Column::ApiKey,
                crate::entities::users::Column::CreatedAt,
            ])
            .values_panic(["admin".into(), DEFAULT_API_KEY.into(), now.into()])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comments).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reviews).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GenreTitles).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TitlesTable::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Genres).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum TitlesTable {
    #[sea_orm(iden = "titles")]
    Table,
    Id,
    Name,
    CategoryId,
}

#[derive(DeriveIden)]
enum CategoriesTable {
    #[sea_orm(iden = "categories")]
    Table,
    Id,
}
