pub mod amenity;
pub mod auth;
pub mod image;
pub mod place;
pub mod reservation;
pub mod review;
pub mod user;
