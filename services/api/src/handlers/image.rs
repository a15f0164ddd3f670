use axum::{
    Json,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hbnb_auth_types::identity::Identity;

use crate::domain::types::PlaceImage;
use crate::error::ApiError;
use crate::handlers::{MessageResponse, multipart_file, parse_body};
use crate::state::AppState;
use crate::usecase::image::{
    AddImageUseCase, DeleteImageUseCase, ImageSource, ListImagesUseCase, UpdateImageUseCase,
};

#[derive(Serialize)]
pub struct ImageResponse {
    pub id: String,
    pub place_id: String,
    pub url: String,
    #[serde(serialize_with = "hbnb_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<PlaceImage> for ImageResponse {
    fn from(image: PlaceImage) -> Self {
        Self {
            id: image.id.to_string(),
            place_id: image.place_id.to_string(),
            url: image.url,
            created_at: image.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct ImageUrlRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, PartialEq, Eq)]
enum BodyKind {
    Multipart,
    Json,
    Other,
}

fn body_kind(headers: &HeaderMap) -> BodyKind {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if content_type.starts_with("multipart/form-data") {
        BodyKind::Multipart
    } else if content_type.starts_with("application/json") {
        BodyKind::Json
    } else {
        BodyKind::Other
    }
}

// ── GET /api/places/{id}/images ──────────────────────────────────────────────

pub async fn list_images(
    State(state): State<AppState>,
    Path(place_id): Path<Uuid>,
) -> Result<Json<Vec<ImageResponse>>, ApiError> {
    let usecase = ListImagesUseCase {
        places: state.place_repo(),
        images: state.image_repo(),
    };
    let images = usecase.execute(place_id).await?;
    Ok(Json(images.into_iter().map(ImageResponse::from).collect()))
}

// ── POST /api/places/{id}/images ─────────────────────────────────────────────

/// Accepts either a multipart upload (`file`) or JSON `{ "url": ... }`.
pub async fn add_image(
    identity: Identity,
    State(state): State<AppState>,
    Path(place_id): Path<Uuid>,
    request: Request,
) -> Result<(StatusCode, Json<ImageResponse>), ApiError> {
    let usecase = AddImageUseCase {
        places: state.place_repo(),
        images: state.image_repo(),
        uploads: state.uploads.clone(),
    };
    let place = usecase.authorize(identity.user_id, place_id).await?;

    let kind = body_kind(request.headers());
    let source = match kind {
        BodyKind::Multipart => {
            let file = multipart_file(Multipart::from_request(request, &state).await).await?;
            ImageSource::Upload {
                file_name: file.file_name,
                data: file.data,
            }
        }
        BodyKind::Json => {
            let body = Bytes::from_request(request, &state)
                .await
                .map_err(|e| ApiError::validation(e.body_text()))?;
            let body: ImageUrlRequest = parse_body(&body)?;
            ImageSource::Url(body.url)
        }
        BodyKind::Other => return Err(ApiError::UnsupportedMediaType),
    };

    let image = usecase.execute(&place, source).await?;
    Ok((StatusCode::CREATED, Json(image.into())))
}

// ── PUT /api/places/{id}/images/{image_id} ───────────────────────────────────

pub async fn update_image(
    identity: Identity,
    State(state): State<AppState>,
    Path((place_id, image_id)): Path<(Uuid, Uuid)>,
    body: Bytes,
) -> Result<Json<ImageResponse>, ApiError> {
    let usecase = UpdateImageUseCase {
        places: state.place_repo(),
        images: state.image_repo(),
    };
    let image = usecase
        .authorize(identity.user_id, place_id, image_id)
        .await?;
    let body: ImageUrlRequest = parse_body(&body)?;
    let image = usecase.execute(image, &body.url).await?;
    Ok(Json(image.into()))
}

// ── DELETE /api/places/{id}/images/{image_id} ────────────────────────────────

pub async fn delete_image(
    identity: Identity,
    State(state): State<AppState>,
    Path((place_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let usecase = DeleteImageUseCase {
        places: state.place_repo(),
        images: state.image_repo(),
    };
    usecase
        .execute(identity.user_id, place_id, image_id)
        .await?;
    Ok(Json(MessageResponse::new("Image deleted")))
}
