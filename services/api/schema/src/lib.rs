//! sea-orm entities for the HBnB API database.

pub mod amenities;
pub mod place_amenities;
pub mod place_images;
pub mod places;
pub mod reservations;
pub mod reviews;
pub mod users;
