pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_places;
mod m20260301_000003_create_amenities;
mod m20260301_000004_create_place_images;
mod m20260301_000005_create_reservations;
mod m20260301_000006_create_reviews;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_users::Migration),
            Box::new(m20260301_000002_create_places::Migration),
            Box::new(m20260301_000003_create_amenities::Migration),
            Box::new(m20260301_000004_create_place_images::Migration),
            Box::new(m20260301_000005_create_reservations::Migration),
            Box::new(m20260301_000006_create_reviews::Migration),
        ]
    }
}
