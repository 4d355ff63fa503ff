//! Asset store
//!
//! Uploaded images on disk, one file per image, referenced from vehicle
//! records as `/uploads/<file name>`. File names are the sanitized original
//! name prefixed with a strictly increasing microsecond stamp, so concurrent
//! uploads of the same name never collide. No business rules live here.

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::UPLOADS_URL_PREFIX;
use crate::models::ImageUpload;
use crate::utils::errors::{validation_error, AppError, AppResult};
use crate::utils::validation::{file_extension, sanitize_filename};

const ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "webp"];
const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];
const MAX_NAME_ATTEMPTS: usize = 8;

/// Outcome of deleting one asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetDeletion {
    Removed,
    /// Nothing to delete; not an error for the caller's larger operation
    Missing,
}

/// One asset that could not be removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFailure {
    pub asset_ref: String,
    pub reason: String,
}

/// Result of a best-effort multi-asset deletion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetCleanup {
    pub removed: Vec<String>,
    pub missing: Vec<String>,
    pub failures: Vec<AssetFailure>,
}

impl AssetCleanup {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, asset_ref: &str, outcome: AppResult<AssetDeletion>) {
        match outcome {
            Ok(AssetDeletion::Removed) => self.removed.push(asset_ref.to_string()),
            Ok(AssetDeletion::Missing) => self.missing.push(asset_ref.to_string()),
            Err(e) => self.failures.push(AssetFailure {
                asset_ref: asset_ref.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[derive(Debug)]
pub struct AssetStore {
    root: PathBuf,
    max_bytes: usize,
    last_stamp: AtomicI64,
}

impl AssetStore {
    /// Open the store, creating the directory if needed
    pub async fn open(root: impl Into<PathBuf>, max_bytes: usize) -> AppResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        info!("🖼️ Asset store ready at {}", root.display());
        Ok(Self {
            root,
            max_bytes,
            last_stamp: AtomicI64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reject non-images and oversized payloads before anything is written
    pub fn validate(&self, upload: &ImageUpload) -> AppResult<()> {
        let extension_ok = file_extension(&upload.original_name)
            .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false);
        let content_type_ok = upload
            .content_type
            .as_deref()
            .map(|ct| {
                let essence = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
                ALLOWED_CONTENT_TYPES.contains(&essence.as_str())
            })
            .unwrap_or(false);

        if !(extension_ok && content_type_ok) {
            return Err(validation_error(format!(
                "Only images are allowed (jpeg, jpg, png, webp): '{}'",
                upload.original_name
            )));
        }

        if upload.bytes.len() > self.max_bytes {
            return Err(validation_error(format!(
                "Image '{}' exceeds the {} byte limit",
                upload.original_name, self.max_bytes
            )));
        }

        Ok(())
    }

    /// Write one image and return its reference
    pub async fn store(&self, upload: &ImageUpload) -> AppResult<String> {
        self.validate(upload)?;
        let safe_name = sanitize_filename(&upload.original_name);

        for _ in 0..MAX_NAME_ATTEMPTS {
            let file_name = format!("{}-{}", self.next_stamp(), safe_name);
            let path = self.root.join(&file_name);

            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            if let Err(e) = write_all(&mut file, &upload.bytes).await {
                let _ = fs::remove_file(&path).await;
                return Err(e);
            }

            debug!("🖼️ Stored asset {} ({} bytes)", file_name, upload.bytes.len());
            return Ok(format!("{}/{}", UPLOADS_URL_PREFIX, file_name));
        }

        Err(AppError::Storage(format!(
            "could not allocate a unique name for '{}'",
            safe_name
        )))
    }

    /// Delete one asset; deleting an absent asset reports `Missing`
    pub async fn delete(&self, asset_ref: &str) -> AppResult<AssetDeletion> {
        let Some(path) = self.resolve(asset_ref) else {
            warn!("⚠️ Ignoring foreign asset reference '{}'", asset_ref);
            return Ok(AssetDeletion::Missing);
        };

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("🗑️ Removed asset {}", asset_ref);
                Ok(AssetDeletion::Removed)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("⚠️ Asset already gone: {}", asset_ref);
                Ok(AssetDeletion::Missing)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every asset independently; failures are collected, never propagated
    pub async fn delete_all(&self, asset_refs: &[String]) -> AssetCleanup {
        let outcomes = join_all(asset_refs.iter().map(|r| self.delete(r))).await;

        let mut cleanup = AssetCleanup::default();
        for (asset_ref, outcome) in asset_refs.iter().zip(outcomes) {
            if let Err(e) = &outcome {
                warn!("⚠️ Could not delete asset {}: {}", asset_ref, e);
            }
            cleanup.record(asset_ref, outcome);
        }
        cleanup
    }

    /// Whether the referenced file is present
    pub async fn exists(&self, asset_ref: &str) -> bool {
        match self.resolve(asset_ref) {
            Some(path) => fs::try_exists(path).await.unwrap_or(false),
            None => false,
        }
    }

    /// Map a reference to its file; references outside the store resolve to `None`
    pub fn resolve(&self, asset_ref: &str) -> Option<PathBuf> {
        let file_name = asset_ref
            .strip_prefix(UPLOADS_URL_PREFIX)?
            .strip_prefix('/')?;
        if file_name.is_empty() || file_name == "." || file_name == ".." {
            return None;
        }
        if sanitize_filename(file_name) != file_name {
            return None;
        }
        Some(self.root.join(file_name))
    }

    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp_micros();
        let previous = self
            .last_stamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(previous + 1)
    }
}

async fn write_all(file: &mut fs::File, bytes: &[u8]) -> AppResult<()> {
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(name: &str) -> ImageUpload {
        ImageUpload::new(name, Some("image/jpeg"), vec![0xFF, 0xD8, 0xFF, 0xE0])
    }

    async fn store_in(dir: &tempfile::TempDir) -> AssetStore {
        AssetStore::open(dir.path().join("uploads"), 1024).await.unwrap()
    }

    #[tokio::test]
    async fn store_sanitizes_and_prefixes_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        let asset_ref = store.store(&jpeg("front view (1).jpg")).await.unwrap();

        assert!(asset_ref.starts_with("/uploads/"));
        assert!(asset_ref.ends_with("-front_view__1_.jpg"));
        assert!(store.exists(&asset_ref).await);
    }

    #[tokio::test]
    async fn same_name_uploads_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        let (first, second) = (jpeg("car.jpg"), jpeg("car.jpg"));
        let (a, b) = tokio::join!(store.store(&first), store.store(&second));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a, b);
        assert!(store.exists(&a).await);
        assert!(store.exists(&b).await);
    }

    #[tokio::test]
    async fn rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        let pdf = ImageUpload::new("brochure.pdf", Some("application/pdf"), vec![1, 2, 3]);
        assert!(store.store(&pdf).await.unwrap_err().is_validation());

        // extension and content type must both agree
        let disguised = ImageUpload::new("script.jpg", Some("text/html"), vec![1]);
        assert!(store.validate(&disguised).unwrap_err().is_validation());
        let untyped = ImageUpload::new("car.png", None, vec![1]);
        assert!(store.validate(&untyped).unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn rejects_oversized_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        let big = ImageUpload::new("big.png", Some("image/png"), vec![0u8; 1025]);
        assert!(store.store(&big).await.unwrap_err().is_validation());
        assert_eq!(std::fs::read_dir(store.root()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;
        let asset_ref = store.store(&jpeg("car.jpg")).await.unwrap();

        assert_eq!(store.delete(&asset_ref).await.unwrap(), AssetDeletion::Removed);
        assert_eq!(store.delete(&asset_ref).await.unwrap(), AssetDeletion::Missing);
    }

    #[tokio::test]
    async fn delete_all_reports_each_asset() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;
        let kept = store.store(&jpeg("a.jpg")).await.unwrap();

        let cleanup = store
            .delete_all(&[kept.clone(), "/uploads/1-gone.jpg".to_string()])
            .await;

        assert_eq!(cleanup.removed, vec![kept]);
        assert_eq!(cleanup.missing, vec!["/uploads/1-gone.jpg".to_string()]);
        assert!(cleanup.is_clean());
    }

    #[tokio::test]
    async fn references_cannot_escape_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        assert!(store.resolve("/uploads/../data/vehicles.json").is_none());
        assert!(store.resolve("/etc/passwd").is_none());
        assert!(store.resolve("/uploads/").is_none());
        assert!(store.resolve("/uploads/..").is_none());
        assert!(store.resolve("/uploads/123-car.jpg").is_some());
    }
}
