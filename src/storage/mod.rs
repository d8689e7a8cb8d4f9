//! Object storage for tree photos.
//!
//! A bucket is a directory under the storage root; blobs are served back
//! read-only under `/storage/{bucket}/{name}`.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::errors::AppError;

/// Bucket holding tree photos.
pub const TREES_BUCKET: &str = "trees";

/// Route prefix the storage root is served under.
pub const STORAGE_ROUTE: &str = "/storage";

/// A single bucket of named blobs with public URLs.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    bucket_dir: PathBuf,
    public_prefix: String,
}

impl ObjectStorage {
    /// Open (creating if needed) `bucket` under `root`.
    pub async fn open(root: &Path, bucket: &str, public_base_url: &str) -> Result<Self, AppError> {
        let bucket_dir = root.join(bucket);
        tokio::fs::create_dir_all(&bucket_dir).await?;

        Ok(Self {
            bucket_dir,
            public_prefix: format!(
                "{}{}/{}/",
                public_base_url.trim_end_matches('/'),
                STORAGE_ROUTE,
                bucket
            ),
        })
    }

    /// Write a blob under `name`. Fails if the name is already taken.
    pub async fn upload(&self, name: &str, bytes: &[u8]) -> Result<(), AppError> {
        let path = self.blob_path(name)?;
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| AppError::Upload(format!("Could not store {}: {}", name, e)))?;

        fill_blob(file, &path, bytes)
            .await
            .map_err(|e| AppError::Upload(format!("Could not store {}: {}", name, e)))?;

        tracing::debug!("Stored blob {} ({} bytes)", name, bytes.len());
        Ok(())
    }

    /// Public URL for a blob name.
    pub fn public_url(&self, name: &str) -> String {
        format!("{}{}", self.public_prefix, name)
    }

    /// Remove blobs by name. Missing blobs are not an error.
    pub async fn remove(&self, names: &[&str]) -> Result<(), AppError> {
        for name in names {
            let path = self.blob_path(name)?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!("Removed blob {}", name),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Blob name behind a public URL, if this bucket issued it.
    pub fn blob_name_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.public_prefix.as_str())
            .filter(|name| is_safe_name(name))
    }

    fn blob_path(&self, name: &str) -> Result<PathBuf, AppError> {
        if !is_safe_name(name) {
            return Err(AppError::BadRequest(format!("Invalid blob name: {}", name)));
        }
        Ok(self.bucket_dir.join(name))
    }
}

/// Write a freshly created blob. A blob whose write fails is removed so no
/// partial file is left behind.
async fn fill_blob(mut file: File, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let written = match file.write_all(bytes).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };

    if let Err(e) = written {
        drop(file);
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            tracing::warn!(
                "Failed to remove partial blob {}: {}",
                path.display(),
                remove_err
            );
        }
        return Err(e);
    }

    Ok(())
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upload_url_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ObjectStorage::open(temp_dir.path(), TREES_BUCKET, "http://host/")
            .await
            .unwrap();

        storage.upload("1700000000000-abcd1234.png", b"png").await.unwrap();
        let url = storage.public_url("1700000000000-abcd1234.png");

        assert_eq!(url, "http://host/storage/trees/1700000000000-abcd1234.png");
        assert_eq!(storage.blob_name_for_url(&url), Some("1700000000000-abcd1234.png"));
        let blob = temp_dir.path().join(TREES_BUCKET).join("1700000000000-abcd1234.png");
        assert_eq!(std::fs::read(&blob).unwrap(), b"png");

        storage.remove(&["1700000000000-abcd1234.png"]).await.unwrap();
        assert!(!blob.exists());

        // Removing again is fine
        storage.remove(&["1700000000000-abcd1234.png"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_partial_blob() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("1700000000000-deadbeef.jpg");
        std::fs::write(&path, b"").unwrap();

        // Read-only handle: every write fails
        let file = File::open(&path).await.unwrap();
        let result = fill_blob(file, &path, b"jpeg bytes").await;

        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_foreign_and_unsafe_urls_are_not_ours() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ObjectStorage::open(temp_dir.path(), TREES_BUCKET, "http://host")
            .await
            .unwrap();

        assert_eq!(
            storage.blob_name_for_url("https://images.unsplash.com/photo-1542202229"),
            None
        );
        assert_eq!(
            storage.blob_name_for_url("http://host/storage/trees/../secrets"),
            None
        );
        assert!(storage.upload("../escape.jpg", b"x").await.is_err());
    }
}
