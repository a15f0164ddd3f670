use sea_orm::entity::prelude::*;

/// Catalog entry shared across places (e.g. "wifi").
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "amenities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::place_amenities::Entity")]
    PlaceAmenities,
}

impl Related<super::places::Entity> for Entity {
    fn to() -> RelationDef {
        super::place_amenities::Relation::Place.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::place_amenities::Relation::Amenity.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
