use chrono::{Duration, Utc};
use uuid::Uuid;

use hbnb_api::domain::types::Review;
use hbnb_api::error::ApiError;
use hbnb_api::usecase::review::{
    CreateReviewInput, CreateReviewUseCase, DeleteReviewUseCase, UpdateReviewInput,
    UpdateReviewUseCase,
};
use hbnb_domain::rating::Rating;

use crate::helpers::{
    MockPlaceRepo, MockReservationRepo, MockReviewRepo, test_place, test_reservation,
};

fn good_review() -> CreateReviewInput {
    CreateReviewInput {
        comment: Some("Lovely stay".to_owned()),
        rating: Some(5),
    }
}

fn existing_review(user_id: Uuid, place_id: Uuid) -> Review {
    Review {
        id: Uuid::now_v7(),
        place_id,
        user_id,
        rating: Rating::try_from(4).unwrap(),
        comment: "Fine".to_owned(),
        created_at: Utc::now(),
    }
}

/// A guest whose two-hour stay ended `ended_ago` before now.
fn gate(
    ended_ago: Duration,
) -> (
    Uuid,
    Uuid,
    CreateReviewUseCase<MockPlaceRepo, MockReservationRepo, MockReviewRepo>,
) {
    let guest = Uuid::now_v7();
    let place = test_place(Uuid::now_v7());
    let end = Utc::now() - ended_ago;
    let reservation = test_reservation(guest, place.id, end - Duration::hours(2), end);
    let usecase = CreateReviewUseCase {
        places: MockPlaceRepo::new(vec![place.clone()]),
        reservations: MockReservationRepo::new(vec![reservation]),
        reviews: MockReviewRepo::empty(),
    };
    (guest, place.id, usecase)
}

// ── Review gate ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_refuse_review_ten_minutes_after_checkout() {
    let (guest, place_id, usecase) = gate(Duration::minutes(10));
    let result = usecase.execute(guest, place_id, good_review()).await;
    assert!(
        matches!(result, Err(ApiError::ReviewNotAllowed)),
        "expected ReviewNotAllowed, got {result:?}"
    );
}

#[tokio::test]
async fn should_accept_review_sixteen_minutes_after_checkout() {
    let (guest, place_id, usecase) = gate(Duration::minutes(16));
    let review = usecase
        .execute(guest, place_id, good_review())
        .await
        .unwrap();
    assert_eq!(review.review.user_id, guest);
    assert_eq!(review.review.rating.get(), 5);
}

#[tokio::test]
async fn should_refuse_review_during_stay() {
    let guest = Uuid::now_v7();
    let place = test_place(Uuid::now_v7());
    let now = Utc::now();
    let reservation =
        test_reservation(guest, place.id, now - Duration::hours(1), now + Duration::hours(1));
    let usecase = CreateReviewUseCase {
        places: MockPlaceRepo::new(vec![place.clone()]),
        reservations: MockReservationRepo::new(vec![reservation]),
        reviews: MockReviewRepo::empty(),
    };
    let result = usecase.execute(guest, place.id, good_review()).await;
    assert!(matches!(result, Err(ApiError::ReviewNotAllowed)));
}

#[tokio::test]
async fn should_refuse_review_without_reservation() {
    let place = test_place(Uuid::now_v7());
    let usecase = CreateReviewUseCase {
        places: MockPlaceRepo::new(vec![place.clone()]),
        reservations: MockReservationRepo::empty(),
        reviews: MockReviewRepo::empty(),
    };
    let result = usecase.execute(Uuid::now_v7(), place.id, good_review()).await;
    assert!(matches!(result, Err(ApiError::ReviewNotAllowed)));
}

#[tokio::test]
async fn should_refuse_second_review_of_same_place() {
    let (guest, place_id, usecase) = gate(Duration::days(1));
    usecase
        .execute(guest, place_id, good_review())
        .await
        .unwrap();

    let result = usecase.execute(guest, place_id, good_review()).await;
    assert!(
        matches!(result, Err(ApiError::AlreadyReviewed)),
        "expected AlreadyReviewed, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_out_of_range_or_missing_rating() {
    let (guest, place_id, usecase) = gate(Duration::days(1));
    for rating in [Some(0), Some(6), None] {
        let result = usecase
            .execute(
                guest,
                place_id,
                CreateReviewInput {
                    comment: Some("ok".to_owned()),
                    rating,
                },
            )
            .await;
        assert!(
            matches!(result, Err(ApiError::Validation(_))),
            "rating {rating:?}: got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_return_not_found_for_unknown_place() {
    let (guest, _, usecase) = gate(Duration::days(1));
    let result = usecase.execute(guest, Uuid::now_v7(), good_review()).await;
    assert!(matches!(result, Err(ApiError::PlaceNotFound)));
}

// ── Update / delete ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_forbid_non_author_update_and_delete() {
    let review = existing_review(Uuid::now_v7(), Uuid::now_v7());
    let update = UpdateReviewUseCase {
        reviews: MockReviewRepo::new(vec![review.clone()]),
    };
    let result = update.authorize(Uuid::now_v7(), review.id).await;
    assert!(matches!(result, Err(ApiError::Forbidden)));

    let reviews = MockReviewRepo::new(vec![review.clone()]);
    let stored = reviews.reviews_handle();
    let delete = DeleteReviewUseCase { reviews };
    let result = delete.execute(Uuid::now_v7(), review.id).await;
    assert!(matches!(result, Err(ApiError::Forbidden)));
    assert_eq!(stored.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_validate_rating_on_update() {
    let review = existing_review(Uuid::now_v7(), Uuid::now_v7());
    let usecase = UpdateReviewUseCase {
        reviews: MockReviewRepo::new(vec![review.clone()]),
    };
    let own = usecase.authorize(review.user_id, review.id).await.unwrap();

    let result = usecase
        .execute(
            own.clone(),
            UpdateReviewInput {
                rating: Some(9),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::Validation(_))));

    let updated = usecase
        .execute(
            own,
            UpdateReviewInput {
                rating: Some(2),
                comment: Some("Noisy street".to_owned()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.review.rating.get(), 2);
    assert_eq!(updated.review.comment, "Noisy street");
}

#[tokio::test]
async fn should_return_not_found_for_unknown_review() {
    let usecase = DeleteReviewUseCase {
        reviews: MockReviewRepo::empty(),
    };
    let result = usecase.execute(Uuid::now_v7(), Uuid::now_v7()).await;
    assert!(matches!(result, Err(ApiError::ReviewNotFound)));
}
