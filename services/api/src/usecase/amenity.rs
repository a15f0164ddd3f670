use uuid::Uuid;

use crate::domain::repository::{AmenityRepository, PlaceRepository, UserRepository};
use crate::domain::types::{Amenity, Place};
use crate::error::ApiError;
use crate::usecase::place::owned_place;
use crate::usecase::user::require_admin;

fn amenity_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("name must not be empty"));
    }
    Ok(name.to_owned())
}

/// Look the amenity up by name, creating it when unknown. `true` when created.
async fn find_or_create<A: AmenityRepository>(
    amenities: &A,
    name: String,
) -> Result<(Amenity, bool), ApiError> {
    if let Some(existing) = amenities.find_by_name(&name).await? {
        return Ok((existing, false));
    }
    let amenity = Amenity {
        id: Uuid::now_v7(),
        name,
    };
    amenities.create(&amenity).await?;
    Ok((amenity, true))
}

// ── ListAmenities ────────────────────────────────────────────────────────────

pub struct ListAmenitiesUseCase<A: AmenityRepository> {
    pub amenities: A,
}

impl<A: AmenityRepository> ListAmenitiesUseCase<A> {
    pub async fn execute(&self) -> Result<Vec<Amenity>, ApiError> {
        self.amenities.list().await
    }
}

// ── CreateAmenity (admin) ────────────────────────────────────────────────────

pub struct CreateAmenityUseCase<U, A>
where
    U: UserRepository,
    A: AmenityRepository,
{
    pub users: U,
    pub amenities: A,
}

impl<U, A> CreateAmenityUseCase<U, A>
where
    U: UserRepository,
    A: AmenityRepository,
{
    /// Returns the amenity and whether it was newly created.
    pub async fn execute(&self, actor: Uuid, name: &str) -> Result<(Amenity, bool), ApiError> {
        require_admin(&self.users, actor).await?;
        find_or_create(&self.amenities, amenity_name(name)?).await
    }
}

// ── Place amenities ──────────────────────────────────────────────────────────

pub struct ListPlaceAmenitiesUseCase<P: PlaceRepository> {
    pub places: P,
}

impl<P: PlaceRepository> ListPlaceAmenitiesUseCase<P> {
    pub async fn execute(&self, place_id: Uuid) -> Result<Vec<Amenity>, ApiError> {
        self.places
            .find_by_id(place_id)
            .await?
            .ok_or(ApiError::PlaceNotFound)?;
        Ok(self
            .places
            .amenities_of(&[place_id])
            .await?
            .into_iter()
            .map(|(_, amenity)| amenity)
            .collect())
    }
}

pub struct AddPlaceAmenityUseCase<P, A>
where
    P: PlaceRepository,
    A: AmenityRepository,
{
    pub places: P,
    pub amenities: A,
}

impl<P, A> AddPlaceAmenityUseCase<P, A>
where
    P: PlaceRepository,
    A: AmenityRepository,
{
    pub async fn authorize(&self, actor: Uuid, place_id: Uuid) -> Result<Place, ApiError> {
        owned_place(&self.places, actor, place_id).await
    }

    /// Attach the named amenity (created on first use) and return the place's amenities.
    pub async fn execute(&self, place: &Place, name: &str) -> Result<Vec<Amenity>, ApiError> {
        let (amenity, _) = find_or_create(&self.amenities, amenity_name(name)?).await?;
        self.places.attach_amenity(place.id, amenity.id).await?;
        Ok(self
            .places
            .amenities_of(&[place.id])
            .await?
            .into_iter()
            .map(|(_, amenity)| amenity)
            .collect())
    }
}
