use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Amenities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Amenities::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Amenities::Name)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(PlaceAmenities::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PlaceAmenities::PlaceId).uuid().not_null())
                    .col(ColumnDef::new(PlaceAmenities::AmenityId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(PlaceAmenities::PlaceId)
                            .col(PlaceAmenities::AmenityId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PlaceAmenities::Table, PlaceAmenities::PlaceId)
                            .to(Places::Table, Places::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PlaceAmenities::Table, PlaceAmenities::AmenityId)
                            .to(Amenities::Table, Amenities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlaceAmenities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Amenities::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Amenities {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum PlaceAmenities {
    Table,
    PlaceId,
    AmenityId,
}

#[derive(Iden)]
enum Places {
    Table,
    Id,
}
