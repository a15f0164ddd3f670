use std::path::PathBuf;

use anyhow::Context as _;
use bytes::Bytes;
use uuid::Uuid;

use crate::domain::repository::UploadStore;
use crate::error::ApiError;

/// URL prefix under which `UPLOAD_DIR` is served.
pub const UPLOADS_PREFIX: &str = "/uploads";

/// Saves uploads as files under a local directory.
#[derive(Clone)]
pub struct LocalUploadStore {
    pub dir: PathBuf,
}

impl LocalUploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// Reduce a client-supplied file name to `[A-Za-z0-9._-]`, without leading dots.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_owned()
    } else {
        cleaned.to_owned()
    }
}

impl UploadStore for LocalUploadStore {
    async fn save(&self, file_name: Option<&str>, data: Bytes) -> Result<String, ApiError> {
        let stored = format!(
            "{}_{}",
            Uuid::now_v7().simple(),
            sanitize_file_name(file_name.unwrap_or_default())
        );
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create upload dir {}", self.dir.display()))?;
        tokio::fs::write(self.dir.join(&stored), &data)
            .await
            .with_context(|| format!("write upload {stored}"))?;
        tracing::debug!(file = %stored, size = data.len(), "upload stored");
        Ok(format!("{UPLOADS_PREFIX}/{stored}"))
    }
}
