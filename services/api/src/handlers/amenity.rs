use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hbnb_auth_types::identity::Identity;

use crate::domain::types::Amenity;
use crate::error::ApiError;
use crate::handlers::parse_body;
use crate::state::AppState;
use crate::usecase::amenity::{
    AddPlaceAmenityUseCase, CreateAmenityUseCase, ListAmenitiesUseCase,
    ListPlaceAmenitiesUseCase,
};

#[derive(Serialize)]
pub struct AmenityResponse {
    pub id: String,
    pub name: String,
}

impl From<Amenity> for AmenityResponse {
    fn from(amenity: Amenity) -> Self {
        Self {
            id: amenity.id.to_string(),
            name: amenity.name,
        }
    }
}

#[derive(Deserialize)]
pub struct AmenityRequest {
    pub name: String,
}

fn amenity_list(amenities: Vec<Amenity>) -> Json<Vec<AmenityResponse>> {
    Json(amenities.into_iter().map(AmenityResponse::from).collect())
}

// ── GET /api/amenities ───────────────────────────────────────────────────────

pub async fn list_amenities(
    State(state): State<AppState>,
) -> Result<Json<Vec<AmenityResponse>>, ApiError> {
    let usecase = ListAmenitiesUseCase {
        amenities: state.amenity_repo(),
    };
    Ok(amenity_list(usecase.execute().await?))
}

// ── POST /api/amenities ──────────────────────────────────────────────────────

pub async fn create_amenity(
    identity: Identity,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<AmenityResponse>), ApiError> {
    let body: AmenityRequest = parse_body(&body)?;
    let usecase = CreateAmenityUseCase {
        users: state.user_repo(),
        amenities: state.amenity_repo(),
    };
    let (amenity, created) = usecase.execute(identity.user_id, &body.name).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(amenity.into())))
}

// ── GET /api/places/{id}/amenities ───────────────────────────────────────────

pub async fn list_place_amenities(
    State(state): State<AppState>,
    Path(place_id): Path<Uuid>,
) -> Result<Json<Vec<AmenityResponse>>, ApiError> {
    let usecase = ListPlaceAmenitiesUseCase {
        places: state.place_repo(),
    };
    Ok(amenity_list(usecase.execute(place_id).await?))
}

// ── POST /api/places/{id}/amenities ──────────────────────────────────────────

pub async fn add_place_amenity(
    identity: Identity,
    State(state): State<AppState>,
    Path(place_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<Vec<AmenityResponse>>, ApiError> {
    let usecase = AddPlaceAmenityUseCase {
        places: state.place_repo(),
        amenities: state.amenity_repo(),
    };
    let place = usecase.authorize(identity.user_id, place_id).await?;
    let body: AmenityRequest = parse_body(&body)?;
    Ok(amenity_list(usecase.execute(&place, &body.name).await?))
}
