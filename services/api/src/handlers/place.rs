use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hbnb_auth_types::identity::Identity;
use hbnb_domain::pagination::PageRequest;

use crate::domain::types::{PlaceChanges, PlaceDetails, PlaceListing, PlaceSortBy};
use crate::error::ApiError;
use crate::handlers::amenity::AmenityResponse;
use crate::handlers::image::ImageResponse;
use crate::handlers::review::ReviewResponse;
use crate::handlers::{MessageResponse, PageQuery, parse_body};
use crate::state::AppState;
use crate::usecase::place::{
    CreatePlaceInput, CreatePlaceUseCase, DeletePlaceUseCase, GetPlaceUseCase,
    ListPlacesUseCase, UpdatePlaceUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PlaceResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_by_night: i32,
    pub location: Option<String>,
    pub country: Option<String>,
    pub town: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(serialize_with = "hbnb_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub amenities: Vec<AmenityResponse>,
    pub images: Vec<ImageResponse>,
    /// Only present on the detail view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<ReviewResponse>>,
}

impl From<PlaceListing> for PlaceResponse {
    fn from(listing: PlaceListing) -> Self {
        let PlaceListing {
            place,
            amenities,
            images,
        } = listing;
        Self {
            id: place.id.to_string(),
            owner_id: place.owner_id.to_string(),
            name: place.name,
            description: place.description,
            price_by_night: place.price_by_night,
            location: place.location,
            country: place.country,
            town: place.town,
            latitude: place.latitude,
            longitude: place.longitude,
            created_at: place.created_at,
            amenities: amenities.into_iter().map(AmenityResponse::from).collect(),
            images: images.into_iter().map(ImageResponse::from).collect(),
            reviews: None,
        }
    }
}

impl From<PlaceDetails> for PlaceResponse {
    fn from(details: PlaceDetails) -> Self {
        Self {
            reviews: Some(
                details
                    .reviews
                    .into_iter()
                    .map(ReviewResponse::from)
                    .collect(),
            ),
            ..details.listing.into()
        }
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct PlaceListQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub sort: Option<String>,
}

impl PlaceListQuery {
    fn page_request(&self) -> PageRequest {
        PageQuery {
            per_page: self.per_page,
            page: self.page,
        }
        .page_request()
    }
}

// ── GET /api/places ──────────────────────────────────────────────────────────

pub async fn list_places(
    State(state): State<AppState>,
    Query(query): Query<PlaceListQuery>,
) -> Result<Json<Vec<PlaceResponse>>, ApiError> {
    let sort_by = query
        .sort
        .as_deref()
        .and_then(PlaceSortBy::from_kebab_case)
        .unwrap_or_default();
    let usecase = ListPlacesUseCase {
        places: state.place_repo(),
        images: state.image_repo(),
    };
    let listings = usecase.execute(sort_by, query.page_request()).await?;
    Ok(Json(listings.into_iter().map(PlaceResponse::from).collect()))
}

// ── POST /api/places ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreatePlaceRequest {
    pub name: String,
    pub description: Option<String>,
    pub price_by_night: i32,
    pub location: Option<String>,
    pub country: Option<String>,
    pub town: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub amenity_ids: Vec<Uuid>,
}

pub async fn create_place(
    identity: Identity,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<PlaceResponse>), ApiError> {
    let body: CreatePlaceRequest = parse_body(&body)?;
    let usecase = CreatePlaceUseCase {
        places: state.place_repo(),
        images: state.image_repo(),
    };
    let listing = usecase
        .execute(
            identity.user_id,
            CreatePlaceInput {
                name: body.name,
                description: body.description,
                price_by_night: body.price_by_night,
                location: body.location,
                country: body.country,
                town: body.town,
                latitude: body.latitude,
                longitude: body.longitude,
                amenity_ids: body.amenity_ids,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(listing.into())))
}

// ── GET /api/places/{id} ─────────────────────────────────────────────────────

pub async fn get_place(
    State(state): State<AppState>,
    Path(place_id): Path<Uuid>,
) -> Result<Json<PlaceResponse>, ApiError> {
    let usecase = GetPlaceUseCase {
        places: state.place_repo(),
        images: state.image_repo(),
        reviews: state.review_repo(),
    };
    let details = usecase.execute(place_id).await?;
    Ok(Json(details.into()))
}

// ── PUT /api/places/{id} ─────────────────────────────────────────────────────

pub async fn update_place(
    identity: Identity,
    State(state): State<AppState>,
    Path(place_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<PlaceResponse>, ApiError> {
    let usecase = UpdatePlaceUseCase {
        places: state.place_repo(),
        images: state.image_repo(),
    };
    let place = usecase.authorize(identity.user_id, place_id).await?;
    let changes: PlaceChanges = parse_body(&body)?;
    let listing = usecase.execute(place, changes).await?;
    Ok(Json(listing.into()))
}

// ── DELETE /api/places/{id} ──────────────────────────────────────────────────

pub async fn delete_place(
    identity: Identity,
    State(state): State<AppState>,
    Path(place_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let usecase = DeletePlaceUseCase {
        places: state.place_repo(),
    };
    usecase.execute(identity.user_id, place_id).await?;
    Ok(Json(MessageResponse::new("Place deleted")))
}
