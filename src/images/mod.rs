//! Image pipeline: validate, preview, upload and replace a tree's photo.
//!
//! A tree has at most one image. Replacing always supersedes the old blob.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;

use crate::db::Store;
use crate::errors::AppError;
use crate::mapper;
use crate::models::Tree;
use crate::storage::ObjectStorage;

/// Default upper bound for a single image.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Extension taken from the original file name, `jpg` when absent.
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "jpg".to_string())
    }
}

/// Validates and stores tree photos.
#[derive(Debug, Clone)]
pub struct ImagePipeline {
    store: Store,
    storage: ObjectStorage,
    max_bytes: usize,
}

impl ImagePipeline {
    pub fn new(store: Store, storage: ObjectStorage, max_bytes: usize) -> Self {
        Self {
            store,
            storage,
            max_bytes,
        }
    }

    /// Reject non-image MIME types and files over the size ceiling.
    pub fn validate(&self, file: &ImageFile) -> Result<(), AppError> {
        let mime = file.content_type.trim().to_ascii_lowercase();
        if !mime.starts_with("image/") {
            return Err(AppError::validation("image", "Please select an image file"));
        }

        if file.bytes.len() > self.max_bytes {
            return Err(AppError::validation(
                "image",
                format!(
                    "Image size should be less than {}MB",
                    self.max_bytes / (1024 * 1024)
                ),
            ));
        }

        if file.bytes.is_empty() {
            return Err(AppError::validation("image", "Image file is empty"));
        }

        Ok(())
    }

    /// Build a displayable `data:` URI locally, without touching storage.
    pub async fn preview(&self, file: &ImageFile) -> Result<String, AppError> {
        self.validate(file)?;

        let mime = file.content_type.trim().to_ascii_lowercase();
        let bytes = file.bytes.clone();
        let encoded = tokio::task::spawn_blocking(move || BASE64.encode(bytes))
            .await
            .map_err(|e| AppError::Internal(format!("Preview encoding failed: {}", e)))?;

        Ok(format!("data:{};base64,{}", mime, encoded))
    }

    /// Store the file under a generated name and return its public URL.
    /// Single attempt; the storage error is passed through as is.
    pub async fn upload(&self, file: &ImageFile) -> Result<String, AppError> {
        let name = generate_blob_name(&file.extension());

        self.storage.upload(&name, &file.bytes).await?;

        let url = self.storage.public_url(&name);
        tracing::info!("Uploaded image {} ({} bytes)", name, file.bytes.len());
        Ok(url)
    }

    /// Best-effort removal of the blob behind `image_url`. Foreign URLs
    /// (stock photos, other hosts) are left alone.
    pub async fn discard(&self, image_url: &str) {
        let Some(name) = self.storage.blob_name_for_url(image_url) else {
            return;
        };

        if let Err(e) = self.storage.remove(&[name]).await {
            tracing::warn!("Failed to remove image {}, continuing: {}", name, e);
        }
    }

    /// Replace a tree's image: drop the old blob, store the new one, point
    /// the record at it.
    pub async fn replace(&self, tree_id: &str, file: &ImageFile) -> Result<Tree, AppError> {
        self.validate(file)?;

        let existing = self
            .store
            .get_tree_row(tree_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tree not found".to_string()))?;

        if let Some(old_url) = existing.image_url.as_deref().filter(|u| !u.is_empty()) {
            self.discard(old_url).await;
        }

        let url = self
            .upload(file)
            .await
            .map_err(|e| AppError::Upload(format!("Image upload failed: {}", e.message())))?;

        let updated = match self.store.update_tree_image(tree_id, Some(&url)).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                self.discard(&url).await;
                return Err(AppError::NotFound("Tree not found".to_string()));
            }
            Err(e) => {
                self.discard(&url).await;
                return Err(e);
            }
        };

        let mut tree = mapper::to_tree(updated);
        tree.pending_image = false;
        Ok(tree)
    }
}

/// `{unix millis}-{8 hex chars}.{ext}`
fn generate_blob_name(extension: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}.{}",
        Utc::now().timestamp_millis(),
        &suffix[..8],
        extension
    )
}
