use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hbnb_domain::pagination::Sort;
use hbnb_domain::rating::Rating;
use hbnb_domain::stay::Stay;

/// Public path returned for users without an uploaded avatar.
pub const DEFAULT_AVATAR: &str = "/uploads/default-avatar.png";

/// Lifetime of a two-factor code.
pub const TWO_FACTOR_CODE_TTL_MINUTES: i64 = 10;

/// How long an expired record is kept so verification can report `CodeExpired`.
pub const TWO_FACTOR_RETENTION_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: String,
    pub country: String,
    pub town: String,
    pub is_admin: bool,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn avatar_or_default(&self) -> &str {
        self.avatar.as_deref().unwrap_or(DEFAULT_AVATAR)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_by_night: i32,
    pub location: Option<String>,
    pub country: Option<String>,
    pub town: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Place {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// Partial place update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_by_night: Option<i32>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub town: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Replaces the whole amenity set when present.
    pub amenity_ids: Option<Vec<Uuid>>,
}

impl PlaceChanges {
    pub fn apply(&self, place: &mut Place) {
        if let Some(name) = &self.name {
            place.name = name.clone();
        }
        if let Some(description) = &self.description {
            place.description = Some(description.clone());
        }
        if let Some(price) = self.price_by_night {
            place.price_by_night = price;
        }
        if let Some(location) = &self.location {
            place.location = Some(location.clone());
        }
        if let Some(country) = &self.country {
            place.country = Some(country.clone());
        }
        if let Some(town) = &self.town {
            place.town = Some(town.clone());
        }
        if let Some(latitude) = self.latitude {
            place.latitude = Some(latitude);
        }
        if let Some(longitude) = self.longitude {
            place.longitude = Some(longitude);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amenity {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceImage {
    pub id: Uuid,
    pub place_id: Uuid,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// A place with its amenities and images, as listed.
#[derive(Debug, Clone)]
pub struct PlaceListing {
    pub place: Place,
    pub amenities: Vec<Amenity>,
    pub images: Vec<PlaceImage>,
}

impl PlaceListing {
    /// Group `amenities` and `images` under their places, keeping `places` order.
    pub fn assemble(
        places: Vec<Place>,
        amenities: Vec<(Uuid, Amenity)>,
        images: Vec<PlaceImage>,
    ) -> Vec<Self> {
        let mut amenities_by_place: HashMap<Uuid, Vec<Amenity>> = HashMap::new();
        for (place_id, amenity) in amenities {
            amenities_by_place.entry(place_id).or_default().push(amenity);
        }
        let mut images_by_place: HashMap<Uuid, Vec<PlaceImage>> = HashMap::new();
        for image in images {
            images_by_place.entry(image.place_id).or_default().push(image);
        }
        places
            .into_iter()
            .map(|place| Self {
                amenities: amenities_by_place.remove(&place.id).unwrap_or_default(),
                images: images_by_place.remove(&place.id).unwrap_or_default(),
                place,
            })
            .collect()
    }
}

/// A place with everything shown on its detail page.
#[derive(Debug, Clone)]
pub struct PlaceDetails {
    pub listing: PlaceListing,
    pub reviews: Vec<AuthoredReview>,
}

/// Sort options for place list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceSortBy {
    CreatedAt(Sort),
    Price(Sort),
}

impl Default for PlaceSortBy {
    fn default() -> Self {
        Self::CreatedAt(Sort::Desc)
    }
}

impl PlaceSortBy {
    pub fn from_kebab_case(s: &str) -> Option<Self> {
        match s {
            "created-at-desc" => Some(Self::CreatedAt(Sort::Desc)),
            "created-at-asc" => Some(Self::CreatedAt(Sort::Asc)),
            "price-desc" => Some(Self::Price(Sort::Desc)),
            "price-asc" => Some(Self::Price(Sort::Asc)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: Uuid,
    pub place_id: Uuid,
    pub user_id: Uuid,
    pub stay: Stay,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: Uuid,
    pub place_id: Uuid,
    pub user_id: Uuid,
    pub rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Review joined with its author's display fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoredReview {
    pub review: Review,
    pub user_name: String,
    pub user_photo: String,
}

/// Pending second factor for one email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoFactorRecord {
    pub code: String,
    /// Stored as epoch milliseconds so the Redis redeem script can compare it.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
    pub user_id: Uuid,
}

impl TwoFactorRecord {
    pub fn issue(code: String, user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            code,
            expires_at: now + Duration::minutes(TWO_FACTOR_CODE_TTL_MINUTES),
            user_id,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Instant after which the store may forget the record entirely.
    pub fn purge_at(&self) -> DateTime<Utc> {
        self.expires_at + Duration::hours(TWO_FACTOR_RETENTION_HOURS)
    }
}

/// Outcome of presenting a code for an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redemption {
    /// Code matched. The record has been consumed.
    Redeemed(TwoFactorRecord),
    /// Code lifetime is over. The record has been purged.
    Expired,
    /// Wrong code. The record stays for another attempt.
    Mismatch,
    /// No pending record.
    Missing,
}
