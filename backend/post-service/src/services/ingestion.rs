/// Ingestion service - creates image posts from uploads
use super::RequestOrigin;
use crate::db::PostStore;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{NewPost, Post};
use crate::storage::BlobStore;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const UPLOAD_FAILURE: &str = "Error uploading image";

/// Image part of a multipart upload
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub original_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub struct IngestionService {
    store: Arc<dyn PostStore>,
    blobs: Arc<dyn BlobStore>,
    max_bytes: usize,
}

impl IngestionService {
    pub fn new(store: Arc<dyn PostStore>, blobs: Arc<dyn BlobStore>, max_bytes: usize) -> Self {
        Self {
            store,
            blobs,
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Store the image, then persist a post pointing at it.
    ///
    /// A failed insert leaves the stored file behind.
    pub async fn create_post(
        &self,
        user_id: Uuid,
        username: &str,
        caption: Option<String>,
        image: Option<UploadedImage>,
        origin: &RequestOrigin,
    ) -> Result<Post> {
        let image = match image {
            Some(image) if !image.bytes.is_empty() => image,
            _ => {
                metrics::record_upload("rejected");
                return Err(AppError::InvalidArgument("No image uploaded".to_string()));
            }
        };

        if image.bytes.len() > self.max_bytes {
            metrics::record_upload("rejected");
            return Err(AppError::InvalidArgument(format!(
                "Image exceeds the {} byte upload limit",
                self.max_bytes
            )));
        }

        let stored = self
            .blobs
            .put(&image.original_name, &image.bytes)
            .await
            .map_err(|e| {
                metrics::record_upload("error");
                AppError::persist(UPLOAD_FAILURE, e)
            })?;

        let new_post = NewPost {
            post_id: Uuid::now_v7().to_string(),
            user_id,
            username: username.to_string(),
            caption,
            image_url: origin.upload_url(&stored.file_name),
        };

        let post = self.store.insert_post(new_post).await.map_err(|e| {
            metrics::record_upload("error");
            AppError::persist(UPLOAD_FAILURE, e)
        })?;

        metrics::record_upload("success");
        info!(
            post_id = %post.post_id,
            user_id = %user_id,
            file_name = %stored.file_name,
            size = stored.size,
            content_type = image.content_type.as_deref().unwrap_or("unknown"),
            "Post created"
        );

        Ok(post)
    }
}
