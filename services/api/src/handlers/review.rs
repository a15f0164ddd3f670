use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hbnb_auth_types::identity::Identity;

use crate::domain::types::AuthoredReview;
use crate::error::ApiError;
use crate::handlers::parse_body;
use crate::state::AppState;
use crate::usecase::review::{
    CreateReviewInput, CreateReviewUseCase, DeleteReviewUseCase, GetReviewUseCase,
    ListPlaceReviewsUseCase, ListUserReviewsUseCase, UpdateReviewInput, UpdateReviewUseCase,
};

#[derive(Serialize)]
pub struct ReviewResponse {
    pub id: String,
    pub place_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_photo: String,
    pub rating: u8,
    pub comment: String,
    #[serde(serialize_with = "hbnb_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<AuthoredReview> for ReviewResponse {
    fn from(authored: AuthoredReview) -> Self {
        let review = authored.review;
        Self {
            id: review.id.to_string(),
            place_id: review.place_id.to_string(),
            user_id: review.user_id.to_string(),
            user_name: authored.user_name,
            user_photo: authored.user_photo,
            rating: review.rating.get(),
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub comment: Option<String>,
    pub rating: Option<i64>,
}

fn review_list(reviews: Vec<AuthoredReview>) -> Json<Vec<ReviewResponse>> {
    Json(reviews.into_iter().map(ReviewResponse::from).collect())
}

// ── GET /api/places/{id}/reviews ─────────────────────────────────────────────

pub async fn list_place_reviews(
    State(state): State<AppState>,
    Path(place_id): Path<Uuid>,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let usecase = ListPlaceReviewsUseCase {
        places: state.place_repo(),
        reviews: state.review_repo(),
    };
    Ok(review_list(usecase.execute(place_id).await?))
}

// ── POST /api/places/{id}/reviews ────────────────────────────────────────────

pub async fn create_review(
    identity: Identity,
    State(state): State<AppState>,
    Path(place_id): Path<Uuid>,
    body: Bytes,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    let body: ReviewRequest = parse_body(&body)?;
    let usecase = CreateReviewUseCase {
        places: state.place_repo(),
        reservations: state.reservation_repo(),
        reviews: state.review_repo(),
    };
    let review = usecase
        .execute(
            identity.user_id,
            place_id,
            CreateReviewInput {
                comment: body.comment,
                rating: body.rating,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

// ── GET /api/reviews/{id} ────────────────────────────────────────────────────

pub async fn get_review(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let usecase = GetReviewUseCase {
        reviews: state.review_repo(),
    };
    Ok(Json(usecase.execute(review_id).await?.into()))
}

// ── PUT /api/reviews/{id} ────────────────────────────────────────────────────

pub async fn update_review(
    identity: Identity,
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<ReviewResponse>, ApiError> {
    let usecase = UpdateReviewUseCase {
        reviews: state.review_repo(),
    };
    let review = usecase.authorize(identity.user_id, review_id).await?;
    let body: ReviewRequest = parse_body(&body)?;
    let review = usecase
        .execute(
            review,
            UpdateReviewInput {
                comment: body.comment,
                rating: body.rating,
            },
        )
        .await?;
    Ok(Json(review.into()))
}

// ── DELETE /api/reviews/{id} ─────────────────────────────────────────────────

pub async fn delete_review(
    identity: Identity,
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteReviewUseCase {
        reviews: state.review_repo(),
    };
    usecase.execute(identity.user_id, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /api/reviews/user/{user_id} ──────────────────────────────────────────

pub async fn list_user_reviews(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let usecase = ListUserReviewsUseCase {
        reviews: state.review_repo(),
    };
    Ok(review_list(usecase.execute(user_id).await?))
}
