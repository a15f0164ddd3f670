use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hbnb_auth_types::identity::Identity;

use crate::domain::types::Reservation;
use crate::error::ApiError;
use crate::handlers::{PageQuery, parse_body};
use crate::state::AppState;
use crate::usecase::reservation::{
    CreateReservationInput, CreateReservationUseCase, DeleteReservationUseCase,
    GetReservationUseCase, ListReservationsUseCase, ReservationScope, UpdateReservationInput,
    UpdateReservationUseCase,
};

#[derive(Serialize)]
pub struct ReservationResponse {
    pub id: String,
    pub place_id: String,
    pub user_id: String,
    #[serde(serialize_with = "hbnb_core::serde::to_rfc3339_ms")]
    pub start_datetime: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "hbnb_core::serde::to_rfc3339_ms")]
    pub end_datetime: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "hbnb_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(reservation: Reservation) -> Self {
        Self {
            id: reservation.id.to_string(),
            place_id: reservation.place_id.to_string(),
            user_id: reservation.user_id.to_string(),
            start_datetime: reservation.stay.start(),
            end_datetime: reservation.stay.end(),
            created_at: reservation.created_at,
        }
    }
}

async fn list(
    state: &AppState,
    scope: ReservationScope,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    let usecase = ListReservationsUseCase {
        reservations: state.reservation_repo(),
    };
    let reservations = usecase.execute(scope).await?;
    Ok(Json(
        reservations
            .into_iter()
            .map(ReservationResponse::from)
            .collect(),
    ))
}

// ── GET /api/reservations ────────────────────────────────────────────────────

pub async fn list_reservations(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    list(&state, ReservationScope::All(query.page_request())).await
}

// ── GET /api/reservations/place/{place_id} ───────────────────────────────────

pub async fn list_place_reservations(
    State(state): State<AppState>,
    Path(place_id): Path<Uuid>,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    list(&state, ReservationScope::Place(place_id)).await
}

// ── GET /api/reservations/user/{user_id} ─────────────────────────────────────

pub async fn list_user_reservations(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    list(&state, ReservationScope::User(user_id)).await
}

// ── POST /api/reservations ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateReservationRequest {
    pub place_id: Uuid,
    pub start_datetime: String,
    pub end_datetime: String,
}

pub async fn create_reservation(
    identity: Identity,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<ReservationResponse>), ApiError> {
    let body: CreateReservationRequest = parse_body(&body)?;
    let usecase = CreateReservationUseCase {
        places: state.place_repo(),
        reservations: state.reservation_repo(),
    };
    let reservation = usecase
        .execute(
            identity.user_id,
            CreateReservationInput {
                place_id: body.place_id,
                start_datetime: body.start_datetime,
                end_datetime: body.end_datetime,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(reservation.into())))
}

// ── GET /api/reservations/{id} ───────────────────────────────────────────────

pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let usecase = GetReservationUseCase {
        reservations: state.reservation_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── PUT /api/reservations/{id} ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateReservationRequest {
    pub place_id: Option<Uuid>,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
}

pub async fn update_reservation(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<ReservationResponse>, ApiError> {
    let usecase = UpdateReservationUseCase {
        places: state.place_repo(),
        reservations: state.reservation_repo(),
    };
    let reservation = usecase.authorize(identity.user_id, id).await?;
    let body: UpdateReservationRequest = parse_body(&body)?;
    let reservation = usecase
        .execute(
            reservation,
            UpdateReservationInput {
                place_id: body.place_id,
                start_datetime: body.start_datetime,
                end_datetime: body.end_datetime,
            },
        )
        .await?;
    Ok(Json(reservation.into()))
}

// ── DELETE /api/reservations/{id} ────────────────────────────────────────────

pub async fn delete_reservation(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteReservationUseCase {
        reservations: state.reservation_repo(),
    };
    usecase.execute(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
