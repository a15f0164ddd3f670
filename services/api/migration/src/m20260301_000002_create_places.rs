use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Places::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Places::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Places::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Places::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Places::Description).text().null())
                    .col(ColumnDef::new(Places::PriceByNight).integer().not_null())
                    .col(ColumnDef::new(Places::Location).string().null())
                    .col(ColumnDef::new(Places::Country).string_len(64).null())
                    .col(ColumnDef::new(Places::Town).string_len(64).null())
                    .col(ColumnDef::new(Places::Latitude).double().null())
                    .col(ColumnDef::new(Places::Longitude).double().null())
                    .col(
                        ColumnDef::new(Places::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Places::Table, Places::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Places::Table)
                    .col(Places::OwnerId)
                    .name("idx_places_owner_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Places::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Places {
    Table,
    Id,
    OwnerId,
    Name,
    Description,
    PriceByNight,
    Location,
    Country,
    Town,
    Latitude,
    Longitude,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
