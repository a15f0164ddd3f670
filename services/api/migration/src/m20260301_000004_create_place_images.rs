use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlaceImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlaceImages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlaceImages::PlaceId).uuid().not_null())
                    .col(ColumnDef::new(PlaceImages::Url).string_len(512).not_null())
                    .col(
                        ColumnDef::new(PlaceImages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PlaceImages::Table, PlaceImages::PlaceId)
                            .to(Places::Table, Places::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(PlaceImages::Table)
                    .col(PlaceImages::PlaceId)
                    .name("idx_place_images_place_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlaceImages::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PlaceImages {
    Table,
    Id,
    PlaceId,
    Url,
    CreatedAt,
}

#[derive(Iden)]
enum Places {
    Table,
    Id,
}
