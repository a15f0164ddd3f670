use chrono::Utc;
use uuid::Uuid;

use hbnb_domain::rating::Rating;
use hbnb_domain::stay::review_cutoff;

use crate::domain::repository::{PlaceRepository, ReservationRepository, ReviewRepository};
use crate::domain::types::{AuthoredReview, Review};
use crate::error::ApiError;

fn comment(value: String) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::validation("comment must not be empty"));
    }
    Ok(value.to_owned())
}

async fn reload<R: ReviewRepository>(reviews: &R, id: Uuid) -> Result<AuthoredReview, ApiError> {
    reviews
        .find_by_id(id)
        .await?
        .ok_or(ApiError::ReviewNotFound)
}

// ── CreateReview ─────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct CreateReviewInput {
    pub comment: Option<String>,
    pub rating: Option<i64>,
}

/// Review gate: one review per `(user, place)`, and only after a stay at the
/// place has been over for the grace window.
pub struct CreateReviewUseCase<P, V, R>
where
    P: PlaceRepository,
    V: ReservationRepository,
    R: ReviewRepository,
{
    pub places: P,
    pub reservations: V,
    pub reviews: R,
}

impl<P, V, R> CreateReviewUseCase<P, V, R>
where
    P: PlaceRepository,
    V: ReservationRepository,
    R: ReviewRepository,
{
    pub async fn execute(
        &self,
        actor: Uuid,
        place_id: Uuid,
        input: CreateReviewInput,
    ) -> Result<AuthoredReview, ApiError> {
        self.places
            .find_by_id(place_id)
            .await?
            .ok_or(ApiError::PlaceNotFound)?;

        if self.reviews.exists_for(actor, place_id).await? {
            return Err(ApiError::AlreadyReviewed);
        }
        let now = Utc::now();
        if !self
            .reservations
            .has_ended_by(actor, place_id, review_cutoff(now))
            .await?
        {
            return Err(ApiError::ReviewNotAllowed);
        }

        let rating = input
            .rating
            .ok_or_else(|| ApiError::validation("rating is required"))?;
        let rating = Rating::try_from(rating)?;
        let comment = comment(input.comment.unwrap_or_default())?;

        let review = Review {
            id: Uuid::now_v7(),
            place_id,
            user_id: actor,
            rating,
            comment,
            created_at: now,
        };
        self.reviews.create(&review).await?;
        tracing::info!(
            review_id = %review.id,
            place_id = %place_id,
            user_id = %actor,
            "review created"
        );
        reload(&self.reviews, review.id).await
    }
}

// ── GetReview / lists ────────────────────────────────────────────────────────

pub struct GetReviewUseCase<R: ReviewRepository> {
    pub reviews: R,
}

impl<R: ReviewRepository> GetReviewUseCase<R> {
    pub async fn execute(&self, review_id: Uuid) -> Result<AuthoredReview, ApiError> {
        reload(&self.reviews, review_id).await
    }
}

pub struct ListPlaceReviewsUseCase<P, R>
where
    P: PlaceRepository,
    R: ReviewRepository,
{
    pub places: P,
    pub reviews: R,
}

impl<P, R> ListPlaceReviewsUseCase<P, R>
where
    P: PlaceRepository,
    R: ReviewRepository,
{
    pub async fn execute(&self, place_id: Uuid) -> Result<Vec<AuthoredReview>, ApiError> {
        self.places
            .find_by_id(place_id)
            .await?
            .ok_or(ApiError::PlaceNotFound)?;
        self.reviews.list_by_place(place_id).await
    }
}

pub struct ListUserReviewsUseCase<R: ReviewRepository> {
    pub reviews: R,
}

impl<R: ReviewRepository> ListUserReviewsUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<AuthoredReview>, ApiError> {
        self.reviews.list_by_user(user_id).await
    }
}

// ── UpdateReview ─────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct UpdateReviewInput {
    pub comment: Option<String>,
    pub rating: Option<i64>,
}

pub struct UpdateReviewUseCase<R: ReviewRepository> {
    pub reviews: R,
}

impl<R: ReviewRepository> UpdateReviewUseCase<R> {
    /// Authorship gate, run before the request body is read.
    pub async fn authorize(&self, actor: Uuid, review_id: Uuid) -> Result<Review, ApiError> {
        let authored = reload(&self.reviews, review_id).await?;
        if authored.review.user_id != actor {
            return Err(ApiError::Forbidden);
        }
        Ok(authored.review)
    }

    pub async fn execute(
        &self,
        mut review: Review,
        input: UpdateReviewInput,
    ) -> Result<AuthoredReview, ApiError> {
        if let Some(rating) = input.rating {
            review.rating = Rating::try_from(rating)?;
        }
        if let Some(text) = input.comment {
            review.comment = comment(text)?;
        }
        self.reviews.update(&review).await?;
        reload(&self.reviews, review.id).await
    }
}

// ── DeleteReview ─────────────────────────────────────────────────────────────

pub struct DeleteReviewUseCase<R: ReviewRepository> {
    pub reviews: R,
}

impl<R: ReviewRepository> DeleteReviewUseCase<R> {
    pub async fn execute(&self, actor: Uuid, review_id: Uuid) -> Result<(), ApiError> {
        let authored = reload(&self.reviews, review_id).await?;
        if authored.review.user_id != actor {
            return Err(ApiError::Forbidden);
        }
        self.reviews.delete(review_id).await
    }
}
