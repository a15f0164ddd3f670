#![allow(async_fn_in_trait)]

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use hbnb_domain::pagination::PageRequest;

use crate::domain::types::{
    Amenity, AuthoredReview, Place, PlaceImage, PlaceSortBy, Redemption, Reservation, Review,
    TwoFactorRecord, User,
};
use crate::error::ApiError;

pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;
    async fn list(&self, page: PageRequest) -> Result<Vec<User>, ApiError>;
    async fn create(&self, user: &User) -> Result<(), ApiError>;
    /// Persist every mutable column of `user`.
    async fn update(&self, user: &User) -> Result<(), ApiError>;
}

pub trait PlaceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Place>, ApiError>;
    async fn list(&self, sort_by: PlaceSortBy, page: PageRequest) -> Result<Vec<Place>, ApiError>;

    /// Insert the place and link the subset of `amenity_ids` that exist, in one transaction.
    async fn create(&self, place: &Place, amenity_ids: &[Uuid]) -> Result<(), ApiError>;

    /// Save the place; when `amenity_ids` is given, replace its amenity links too.
    /// Runs in one transaction.
    async fn update(&self, place: &Place, amenity_ids: Option<&[Uuid]>) -> Result<(), ApiError>;

    /// Delete the place. Images, links, reservations and reviews cascade.
    async fn delete(&self, id: Uuid) -> Result<(), ApiError>;

    /// `(place_id, amenity)` pairs for the given places.
    async fn amenities_of(&self, place_ids: &[Uuid]) -> Result<Vec<(Uuid, Amenity)>, ApiError>;

    /// Link an amenity to a place. No-op when already linked.
    async fn attach_amenity(&self, place_id: Uuid, amenity_id: Uuid) -> Result<(), ApiError>;
}

pub trait AmenityRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Amenity>, ApiError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Amenity>, ApiError>;
    async fn create(&self, amenity: &Amenity) -> Result<(), ApiError>;
}

pub trait ImageRepository: Send + Sync {
    /// Images of the given places in insertion order.
    async fn list_by_places(&self, place_ids: &[Uuid]) -> Result<Vec<PlaceImage>, ApiError>;
    async fn find(&self, place_id: Uuid, image_id: Uuid) -> Result<Option<PlaceImage>, ApiError>;
    async fn create(&self, image: &PlaceImage) -> Result<(), ApiError>;
    async fn update_url(&self, image_id: Uuid, url: &str) -> Result<(), ApiError>;
    async fn delete(&self, image_id: Uuid) -> Result<(), ApiError>;
}

pub trait ReservationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, ApiError>;
    async fn list(&self, page: PageRequest) -> Result<Vec<Reservation>, ApiError>;
    async fn list_by_place(&self, place_id: Uuid) -> Result<Vec<Reservation>, ApiError>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Reservation>, ApiError>;
    async fn create(&self, reservation: &Reservation) -> Result<(), ApiError>;
    async fn update(&self, reservation: &Reservation) -> Result<(), ApiError>;
    async fn delete(&self, id: Uuid) -> Result<(), ApiError>;

    /// True when `user_id` holds a reservation of `place_id` that ended at or before `cutoff`.
    async fn has_ended_by(
        &self,
        user_id: Uuid,
        place_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> Result<bool, ApiError>;
}

pub trait ReviewRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthoredReview>, ApiError>;
    async fn list_by_place(&self, place_id: Uuid) -> Result<Vec<AuthoredReview>, ApiError>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<AuthoredReview>, ApiError>;
    async fn exists_for(&self, user_id: Uuid, place_id: Uuid) -> Result<bool, ApiError>;

    /// Insert a review. A second review for the same `(user, place)` fails with
    /// `AlreadyReviewed`.
    async fn create(&self, review: &Review) -> Result<(), ApiError>;
    async fn update(&self, review: &Review) -> Result<(), ApiError>;
    async fn delete(&self, id: Uuid) -> Result<(), ApiError>;
}

/// Short-lived two-factor records keyed by email.
pub trait TwoFactorStore: Send + Sync {
    /// Store `record`, replacing any pending one for `email`.
    async fn put(&self, email: &str, record: &TwoFactorRecord) -> Result<(), ApiError>;

    /// Check `code` against the pending record and consume it on a match, as one
    /// atomic step. Expired records are purged. A mismatch leaves the record in place.
    async fn redeem(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Redemption, ApiError>;

    /// Drop any pending record for `email`.
    async fn discard(&self, email: &str) -> Result<(), ApiError>;
}

/// Outbound delivery of two-factor codes.
pub trait MailSender: Send + Sync {
    /// Fails with `ApiError::MailDelivery` when the message cannot be handed off.
    async fn send_two_factor_code(&self, to: &str, code: &str) -> Result<(), ApiError>;
}

pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String, ApiError>;
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, ApiError>;
}

/// Storage for uploaded files.
pub trait UploadStore: Send + Sync {
    /// Save `data` and return its public path (`/uploads/...`).
    async fn save(&self, file_name: Option<&str>, data: Bytes) -> Result<String, ApiError>;
}
