use chrono::{Duration, DurationRound, Utc};
use uuid::Uuid;

use hbnb_api::domain::repository::{PlaceRepository, ReservationRepository, UserRepository};
use hbnb_api::infra::db::{DbPlaceRepository, DbReservationRepository, DbUserRepository};
use hbnb_domain::stay::review_cutoff;

use crate::helpers::{sqlite_db, test_place, test_reservation, test_user};

#[tokio::test]
async fn should_count_only_stays_ended_by_cutoff() {
    let db = sqlite_db().await;
    let users = DbUserRepository { db: db.clone() };
    let places = DbPlaceRepository { db: db.clone() };
    let reservations = DbReservationRepository { db };

    let host = test_user("host");
    let guest = test_user("guest");
    users.create(&host).await.unwrap();
    users.create(&guest).await.unwrap();
    let place = test_place(host.id);
    places.create(&place, &[]).await.unwrap();

    // Whole milliseconds so the stored end compares exactly against the cutoff.
    let now = Utc::now().duration_trunc(Duration::milliseconds(1)).unwrap();
    let cutoff = review_cutoff(now);

    let stay = |start, end| test_reservation(guest.id, place.id, start, end);

    let ongoing = stay(now - Duration::hours(1), now + Duration::hours(1));
    reservations.create(&ongoing).await.unwrap();
    let recent = stay(now - Duration::hours(2), now - Duration::minutes(10));
    reservations.create(&recent).await.unwrap();
    let one_ms_late = stay(cutoff - Duration::hours(2), cutoff + Duration::milliseconds(1));
    reservations.create(&one_ms_late).await.unwrap();
    assert!(
        !reservations
            .has_ended_by(guest.id, place.id, cutoff)
            .await
            .unwrap()
    );

    let on_the_dot = stay(cutoff - Duration::hours(2), cutoff);
    reservations.create(&on_the_dot).await.unwrap();
    assert!(
        reservations
            .has_ended_by(guest.id, place.id, cutoff)
            .await
            .unwrap()
    );

    assert!(
        !reservations
            .has_ended_by(host.id, place.id, cutoff)
            .await
            .unwrap()
    );
    assert!(
        !reservations
            .has_ended_by(guest.id, Uuid::now_v7(), cutoff)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn should_read_back_stored_stay_bounds() {
    let db = sqlite_db().await;
    let users = DbUserRepository { db: db.clone() };
    let places = DbPlaceRepository { db: db.clone() };
    let reservations = DbReservationRepository { db };

    let guest = test_user("reader");
    users.create(&guest).await.unwrap();
    let place = test_place(guest.id);
    places.create(&place, &[]).await.unwrap();

    let end = Utc::now().duration_trunc(Duration::milliseconds(1)).unwrap();
    let booked = test_reservation(guest.id, place.id, end - Duration::hours(3), end);
    reservations.create(&booked).await.unwrap();

    let stored = reservations.find_by_id(booked.id).await.unwrap().unwrap();
    assert_eq!(stored.stay, booked.stay);
    assert_eq!(reservations.list_by_user(guest.id).await.unwrap().len(), 1);
}
