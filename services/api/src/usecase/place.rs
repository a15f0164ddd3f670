use chrono::Utc;
use uuid::Uuid;

use hbnb_domain::pagination::PageRequest;

use crate::domain::repository::{ImageRepository, PlaceRepository, ReviewRepository};
use crate::domain::types::{Place, PlaceChanges, PlaceDetails, PlaceListing, PlaceSortBy};
use crate::error::ApiError;

/// Load a place and require `actor` to own it.
pub async fn owned_place<P: PlaceRepository>(
    places: &P,
    actor: Uuid,
    place_id: Uuid,
) -> Result<Place, ApiError> {
    let place = places
        .find_by_id(place_id)
        .await?
        .ok_or(ApiError::PlaceNotFound)?;
    if !place.is_owned_by(actor) {
        return Err(ApiError::Forbidden);
    }
    Ok(place)
}

async fn listings<P, I>(
    places: &P,
    images: &I,
    items: Vec<Place>,
) -> Result<Vec<PlaceListing>, ApiError>
where
    P: PlaceRepository,
    I: ImageRepository,
{
    let ids: Vec<Uuid> = items.iter().map(|p| p.id).collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let amenities = places.amenities_of(&ids).await?;
    let images = images.list_by_places(&ids).await?;
    Ok(PlaceListing::assemble(items, amenities, images))
}

async fn listing<P, I>(places: &P, images: &I, place: Place) -> Result<PlaceListing, ApiError>
where
    P: PlaceRepository,
    I: ImageRepository,
{
    let amenities = places
        .amenities_of(&[place.id])
        .await?
        .into_iter()
        .map(|(_, amenity)| amenity)
        .collect();
    let images = images.list_by_places(&[place.id]).await?;
    Ok(PlaceListing {
        place,
        amenities,
        images,
    })
}

fn validate(place: &Place) -> Result<(), ApiError> {
    if place.name.trim().is_empty() {
        return Err(ApiError::validation("name must not be empty"));
    }
    if place.price_by_night < 0 {
        return Err(ApiError::validation("price_by_night must not be negative"));
    }
    Ok(())
}

// ── CreatePlace ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct CreatePlaceInput {
    pub name: String,
    pub description: Option<String>,
    pub price_by_night: i32,
    pub location: Option<String>,
    pub country: Option<String>,
    pub town: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub amenity_ids: Vec<Uuid>,
}

pub struct CreatePlaceUseCase<P, I>
where
    P: PlaceRepository,
    I: ImageRepository,
{
    pub places: P,
    pub images: I,
}

impl<P, I> CreatePlaceUseCase<P, I>
where
    P: PlaceRepository,
    I: ImageRepository,
{
    pub async fn execute(
        &self,
        owner: Uuid,
        input: CreatePlaceInput,
    ) -> Result<PlaceListing, ApiError> {
        let place = Place {
            id: Uuid::now_v7(),
            owner_id: owner,
            name: input.name,
            description: input.description,
            price_by_night: input.price_by_night,
            location: input.location,
            country: input.country,
            town: input.town,
            latitude: input.latitude,
            longitude: input.longitude,
            created_at: Utc::now(),
        };
        validate(&place)?;
        self.places.create(&place, &input.amenity_ids).await?;
        tracing::info!(place_id = %place.id, owner_id = %owner, "place created");
        listing(&self.places, &self.images, place).await
    }
}

// ── GetPlace ─────────────────────────────────────────────────────────────────

pub struct GetPlaceUseCase<P, I, R>
where
    P: PlaceRepository,
    I: ImageRepository,
    R: ReviewRepository,
{
    pub places: P,
    pub images: I,
    pub reviews: R,
}

impl<P, I, R> GetPlaceUseCase<P, I, R>
where
    P: PlaceRepository,
    I: ImageRepository,
    R: ReviewRepository,
{
    pub async fn execute(&self, place_id: Uuid) -> Result<PlaceDetails, ApiError> {
        let place = self
            .places
            .find_by_id(place_id)
            .await?
            .ok_or(ApiError::PlaceNotFound)?;
        let listing = listing(&self.places, &self.images, place).await?;
        let reviews = self.reviews.list_by_place(place_id).await?;
        Ok(PlaceDetails { listing, reviews })
    }
}

// ── ListPlaces ───────────────────────────────────────────────────────────────

pub struct ListPlacesUseCase<P, I>
where
    P: PlaceRepository,
    I: ImageRepository,
{
    pub places: P,
    pub images: I,
}

impl<P, I> ListPlacesUseCase<P, I>
where
    P: PlaceRepository,
    I: ImageRepository,
{
    pub async fn execute(
        &self,
        sort_by: PlaceSortBy,
        page: PageRequest,
    ) -> Result<Vec<PlaceListing>, ApiError> {
        let items = self.places.list(sort_by, page).await?;
        listings(&self.places, &self.images, items).await
    }
}

// ── UpdatePlace ──────────────────────────────────────────────────────────────

pub struct UpdatePlaceUseCase<P, I>
where
    P: PlaceRepository,
    I: ImageRepository,
{
    pub places: P,
    pub images: I,
}

impl<P, I> UpdatePlaceUseCase<P, I>
where
    P: PlaceRepository,
    I: ImageRepository,
{
    /// Ownership gate, run before the request body is read.
    pub async fn authorize(&self, actor: Uuid, place_id: Uuid) -> Result<Place, ApiError> {
        owned_place(&self.places, actor, place_id).await
    }

    pub async fn execute(
        &self,
        mut place: Place,
        changes: PlaceChanges,
    ) -> Result<PlaceListing, ApiError> {
        changes.apply(&mut place);
        validate(&place)?;
        self.places
            .update(&place, changes.amenity_ids.as_deref())
            .await?;
        listing(&self.places, &self.images, place).await
    }
}

// ── DeletePlace ──────────────────────────────────────────────────────────────

pub struct DeletePlaceUseCase<P: PlaceRepository> {
    pub places: P,
}

impl<P: PlaceRepository> DeletePlaceUseCase<P> {
    pub async fn execute(&self, actor: Uuid, place_id: Uuid) -> Result<(), ApiError> {
        let place = owned_place(&self.places, actor, place_id).await?;
        self.places.delete(place.id).await?;
        tracing::info!(place_id = %place.id, "place deleted");
        Ok(())
    }
}
