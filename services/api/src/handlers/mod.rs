pub mod amenity;
pub mod auth;
pub mod image;
pub mod place;
pub mod reservation;
pub mod review;
pub mod user;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartRejection;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use hbnb_domain::pagination::PageRequest;

use crate::error::ApiError;

/// Decode a JSON body that was taken as raw bytes.
///
/// Handlers that gate on ownership read the body this way so the 403 check
/// runs before any payload validation.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::validation(format!("invalid body: {e}")))
}

/// An uploaded file taken from the `file` field of a multipart form.
pub(crate) struct UploadedFile {
    pub file_name: Option<String>,
    pub data: Bytes,
}

/// Read the `file` field, skipping any other fields.
pub(crate) async fn multipart_file(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadedFile, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::UnsupportedMediaType)?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("invalid multipart body: {e}")))?;
        return Ok(UploadedFile { file_name, data });
    }
    Err(ApiError::validation("No file part"))
}

/// `{ "message": ... }` acknowledgement body.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct PageQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        let default = PageRequest::default();
        PageRequest {
            per_page: self.per_page.unwrap_or(default.per_page),
            page: self.page.unwrap_or(default.page),
        }
    }
}
