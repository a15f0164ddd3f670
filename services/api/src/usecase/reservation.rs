use chrono::Utc;
use uuid::Uuid;

use hbnb_domain::pagination::PageRequest;
use hbnb_domain::stay::{Stay, parse_timestamp};

use crate::domain::repository::{PlaceRepository, ReservationRepository};
use crate::domain::types::Reservation;
use crate::error::ApiError;

async fn ensure_place<P: PlaceRepository>(places: &P, place_id: Uuid) -> Result<(), ApiError> {
    places
        .find_by_id(place_id)
        .await?
        .ok_or(ApiError::PlaceNotFound)?;
    Ok(())
}

async fn booked_by<V: ReservationRepository>(
    reservations: &V,
    actor: Uuid,
    id: Uuid,
) -> Result<Reservation, ApiError> {
    let reservation = reservations
        .find_by_id(id)
        .await?
        .ok_or(ApiError::ReservationNotFound)?;
    if reservation.user_id != actor {
        return Err(ApiError::Forbidden);
    }
    Ok(reservation)
}

// ── CreateReservation ────────────────────────────────────────────────────────

pub struct CreateReservationInput {
    pub place_id: Uuid,
    pub start_datetime: String,
    pub end_datetime: String,
}

pub struct CreateReservationUseCase<P, V>
where
    P: PlaceRepository,
    V: ReservationRepository,
{
    pub places: P,
    pub reservations: V,
}

impl<P, V> CreateReservationUseCase<P, V>
where
    P: PlaceRepository,
    V: ReservationRepository,
{
    pub async fn execute(
        &self,
        actor: Uuid,
        input: CreateReservationInput,
    ) -> Result<Reservation, ApiError> {
        let stay = Stay::new(
            parse_timestamp(&input.start_datetime)?,
            parse_timestamp(&input.end_datetime)?,
        )?;
        ensure_place(&self.places, input.place_id).await?;

        let reservation = Reservation {
            id: Uuid::now_v7(),
            place_id: input.place_id,
            user_id: actor,
            stay,
            created_at: Utc::now(),
        };
        self.reservations.create(&reservation).await?;
        tracing::info!(
            reservation_id = %reservation.id,
            place_id = %reservation.place_id,
            user_id = %actor,
            "reservation created"
        );
        Ok(reservation)
    }
}

// ── Get / list ───────────────────────────────────────────────────────────────

pub struct GetReservationUseCase<V: ReservationRepository> {
    pub reservations: V,
}

impl<V: ReservationRepository> GetReservationUseCase<V> {
    pub async fn execute(&self, id: Uuid) -> Result<Reservation, ApiError> {
        self.reservations
            .find_by_id(id)
            .await?
            .ok_or(ApiError::ReservationNotFound)
    }
}

/// Which reservations to list.
#[derive(Debug, Clone, Copy)]
pub enum ReservationScope {
    All(PageRequest),
    Place(Uuid),
    User(Uuid),
}

pub struct ListReservationsUseCase<V: ReservationRepository> {
    pub reservations: V,
}

impl<V: ReservationRepository> ListReservationsUseCase<V> {
    pub async fn execute(&self, scope: ReservationScope) -> Result<Vec<Reservation>, ApiError> {
        match scope {
            ReservationScope::All(page) => self.reservations.list(page).await,
            ReservationScope::Place(place_id) => self.reservations.list_by_place(place_id).await,
            ReservationScope::User(user_id) => self.reservations.list_by_user(user_id).await,
        }
    }
}

// ── UpdateReservation ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct UpdateReservationInput {
    pub place_id: Option<Uuid>,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
}

pub struct UpdateReservationUseCase<P, V>
where
    P: PlaceRepository,
    V: ReservationRepository,
{
    pub places: P,
    pub reservations: V,
}

impl<P, V> UpdateReservationUseCase<P, V>
where
    P: PlaceRepository,
    V: ReservationRepository,
{
    /// Booker gate, run before the request body is read.
    pub async fn authorize(&self, actor: Uuid, id: Uuid) -> Result<Reservation, ApiError> {
        booked_by(&self.reservations, actor, id).await
    }

    pub async fn execute(
        &self,
        mut reservation: Reservation,
        input: UpdateReservationInput,
    ) -> Result<Reservation, ApiError> {
        let start = input
            .start_datetime
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;
        let end = input
            .end_datetime
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;
        reservation.stay = reservation.stay.with_bounds(start, end)?;

        if let Some(place_id) = input.place_id {
            if place_id != reservation.place_id {
                ensure_place(&self.places, place_id).await?;
                reservation.place_id = place_id;
            }
        }

        self.reservations.update(&reservation).await?;
        Ok(reservation)
    }
}

// ── DeleteReservation ────────────────────────────────────────────────────────

pub struct DeleteReservationUseCase<V: ReservationRepository> {
    pub reservations: V,
}

impl<V: ReservationRepository> DeleteReservationUseCase<V> {
    pub async fn execute(&self, actor: Uuid, id: Uuid) -> Result<(), ApiError> {
        let reservation = booked_by(&self.reservations, actor, id).await?;
        self.reservations.delete(reservation.id).await
    }
}
