//! Uploaded card images: multipart intake, validation, and disk storage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::extract::Multipart;
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::ImageInput;

/// Maximum accepted image size.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";
/// Public URL prefix stored images are served under.
pub const PUBLIC_PREFIX: &str = "/uploads/business-cards";

/// An image received from a client, not yet stored.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub original_name: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.content_type.starts_with("image/") {
            return Err(AppError::Validation(
                "Only image files are allowed".to_string(),
            ));
        }
        if self.bytes.is_empty() {
            return Err(AppError::Validation("No image file provided".to_string()));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::PayloadTooLarge(format!(
                "Image exceeds the maximum size of {} bytes",
                MAX_IMAGE_BYTES
            )));
        }
        Ok(())
    }

    /// Extension of the original filename including the dot, or empty.
    pub fn extension(&self) -> String {
        self.original_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default()
    }

    pub fn to_image_input(&self) -> ImageInput {
        ImageInput {
            mime: self.content_type.clone(),
            bytes: self.bytes.to_vec(),
        }
    }
}

/// Reads and validates the `image` field of a multipart body.
pub async fn read_image_upload(mut multipart: Multipart) -> Result<ImageUpload, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let original_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;

        let upload = ImageUpload {
            original_name,
            content_type,
            bytes,
        };
        upload.validate()?;
        return Ok(upload);
    }
    Err(AppError::Validation("No image file provided".to_string()))
}

/// Where an image ended up.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub image_url: String,
    pub filename: String,
}

/// Image persistence seam, carried in `AppState` as `Arc<dyn ImageStore>`.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store_image(&self, upload: &ImageUpload) -> Result<StoredImage, AppError>;
}

/// Writes images to `dir` as `business-card-<millis><ext>`.
pub struct DiskImageStore {
    dir: PathBuf,
}

impl DiskImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ImageStore for DiskImageStore {
    async fn store_image(&self, upload: &ImageUpload) -> Result<StoredImage, AppError> {
        let filename = format!(
            "business-card-{}{}",
            chrono::Utc::now().timestamp_millis(),
            upload.extension()
        );
        let path = self.dir.join(&filename);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create upload dir: {e}")))?;
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {e}", path.display())))?;

        info!("Stored uploaded image {} ({} bytes)", filename, upload.bytes.len());

        Ok(StoredImage {
            image_url: format!("{PUBLIC_PREFIX}/{filename}"),
            filename,
        })
    }
}
