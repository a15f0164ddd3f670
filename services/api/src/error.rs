use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use hbnb_domain::rating::RatingError;
use hbnb_domain::stay::{StayError, TimestampError};

/// API service error variants.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("code expired, please login again")]
    CodeExpired,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid code")]
    InvalidCode,
    #[error("authentication required")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("a completed reservation is required before reviewing this place")]
    ReviewNotAllowed,
    #[error("user not found")]
    UserNotFound,
    #[error("place not found")]
    PlaceNotFound,
    #[error("image not found")]
    ImageNotFound,
    #[error("review not found")]
    ReviewNotFound,
    #[error("reservation not found")]
    ReservationNotFound,
    #[error("no code found, please login again")]
    NoSessionFound,
    #[error("email already registered")]
    EmailTaken,
    #[error("phone number already registered")]
    PhoneTaken,
    #[error("username already taken")]
    UsernameTaken,
    #[error("you have already reviewed this place")]
    AlreadyReviewed,
    #[error("unsupported media type")]
    UnsupportedMediaType,
    #[error("failed to send code")]
    MailDelivery(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::CodeExpired => "CODE_EXPIRED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidCode => "INVALID_CODE",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::ReviewNotAllowed => "REVIEW_NOT_ALLOWED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::PlaceNotFound => "PLACE_NOT_FOUND",
            Self::ImageNotFound => "IMAGE_NOT_FOUND",
            Self::ReviewNotFound => "REVIEW_NOT_FOUND",
            Self::ReservationNotFound => "RESERVATION_NOT_FOUND",
            Self::NoSessionFound => "NO_SESSION_FOUND",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::PhoneTaken => "PHONE_TAKEN",
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::AlreadyReviewed => "ALREADY_REVIEWED",
            Self::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            Self::MailDelivery(_) => "MAIL_DELIVERY",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::CodeExpired => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::InvalidCode | Self::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden | Self::ReviewNotAllowed => StatusCode::FORBIDDEN,
            Self::UserNotFound
            | Self::PlaceNotFound
            | Self::ImageNotFound
            | Self::ReviewNotFound
            | Self::ReservationNotFound
            | Self::NoSessionFound => StatusCode::NOT_FOUND,
            Self::EmailTaken | Self::PhoneTaken | Self::UsernameTaken | Self::AlreadyReviewed => {
                StatusCode::CONFLICT
            }
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::MailDelivery(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<RatingError> for ApiError {
    fn from(e: RatingError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<StayError> for ApiError {
    fn from(e: StayError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<TimestampError> for ApiError {
    fn from(e: TimestampError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are already recorded by the trace layer.
        if let Self::Internal(e) | Self::MailDelivery(e) = &self {
            tracing::error!(error = %format!("{e:#}"), kind = self.kind(), "request failed");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
