use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{ImageRepository, PlaceRepository, UploadStore};
use crate::domain::types::{Place, PlaceImage};
use crate::error::ApiError;
use crate::usecase::place::owned_place;

/// Where a new place image comes from.
pub enum ImageSource {
    Upload {
        file_name: Option<String>,
        data: Bytes,
    },
    Url(String),
}

fn image_url(url: &str) -> Result<String, ApiError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ApiError::validation("Missing URL"));
    }
    Ok(url.to_owned())
}

// ── ListImages ───────────────────────────────────────────────────────────────

pub struct ListImagesUseCase<P, I>
where
    P: PlaceRepository,
    I: ImageRepository,
{
    pub places: P,
    pub images: I,
}

impl<P, I> ListImagesUseCase<P, I>
where
    P: PlaceRepository,
    I: ImageRepository,
{
    pub async fn execute(&self, place_id: Uuid) -> Result<Vec<PlaceImage>, ApiError> {
        self.places
            .find_by_id(place_id)
            .await?
            .ok_or(ApiError::PlaceNotFound)?;
        self.images.list_by_places(&[place_id]).await
    }
}

// ── AddImage ─────────────────────────────────────────────────────────────────

pub struct AddImageUseCase<P, I, S>
where
    P: PlaceRepository,
    I: ImageRepository,
    S: UploadStore,
{
    pub places: P,
    pub images: I,
    pub uploads: S,
}

impl<P, I, S> AddImageUseCase<P, I, S>
where
    P: PlaceRepository,
    I: ImageRepository,
    S: UploadStore,
{
    pub async fn authorize(&self, actor: Uuid, place_id: Uuid) -> Result<Place, ApiError> {
        owned_place(&self.places, actor, place_id).await
    }

    pub async fn execute(
        &self,
        place: &Place,
        source: ImageSource,
    ) -> Result<PlaceImage, ApiError> {
        let url = match source {
            ImageSource::Upload { file_name, data } => {
                if data.is_empty() {
                    return Err(ApiError::validation("file is empty"));
                }
                self.uploads.save(file_name.as_deref(), data).await?
            }
            ImageSource::Url(url) => image_url(&url)?,
        };
        let image = PlaceImage {
            id: Uuid::now_v7(),
            place_id: place.id,
            url,
            created_at: Utc::now(),
        };
        self.images.create(&image).await?;
        Ok(image)
    }
}

// ── UpdateImage ──────────────────────────────────────────────────────────────

pub struct UpdateImageUseCase<P, I>
where
    P: PlaceRepository,
    I: ImageRepository,
{
    pub places: P,
    pub images: I,
}

impl<P, I> UpdateImageUseCase<P, I>
where
    P: PlaceRepository,
    I: ImageRepository,
{
    pub async fn authorize(
        &self,
        actor: Uuid,
        place_id: Uuid,
        image_id: Uuid,
    ) -> Result<PlaceImage, ApiError> {
        owned_image(&self.places, &self.images, actor, place_id, image_id).await
    }

    pub async fn execute(&self, mut image: PlaceImage, url: &str) -> Result<PlaceImage, ApiError> {
        image.url = image_url(url)?;
        self.images.update_url(image.id, &image.url).await?;
        Ok(image)
    }
}

// ── DeleteImage ──────────────────────────────────────────────────────────────

pub struct DeleteImageUseCase<P, I>
where
    P: PlaceRepository,
    I: ImageRepository,
{
    pub places: P,
    pub images: I,
}

impl<P, I> DeleteImageUseCase<P, I>
where
    P: PlaceRepository,
    I: ImageRepository,
{
    pub async fn execute(
        &self,
        actor: Uuid,
        place_id: Uuid,
        image_id: Uuid,
    ) -> Result<(), ApiError> {
        let image = owned_image(&self.places, &self.images, actor, place_id, image_id).await?;
        self.images.delete(image.id).await
    }
}

async fn owned_image<P, I>(
    places: &P,
    images: &I,
    actor: Uuid,
    place_id: Uuid,
    image_id: Uuid,
) -> Result<PlaceImage, ApiError>
where
    P: PlaceRepository,
    I: ImageRepository,
{
    let place = owned_place(places, actor, place_id).await?;
    images
        .find(place.id, image_id)
        .await?
        .ok_or(ApiError::ImageNotFound)
}
