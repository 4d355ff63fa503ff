//! Storage configuration
//!
//! Where the catalog document and uploaded images live, and the limits
//! enforced on them.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// 5 MiB per image
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_MIN_IMAGES_ON_CREATE: usize = 5;
pub const DEFAULT_MAX_IMAGES_PER_REQUEST: usize = 10;

/// Public URL prefix under which stored images are referenced and served
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

const DOCUMENT_FILE_NAME: &str = "vehicles.json";

/// Rules applied to vehicle records and their photos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogRules {
    pub min_images_on_create: usize,
    pub max_images_per_request: usize,
    pub max_image_bytes: usize,
}

impl Default for CatalogRules {
    fn default() -> Self {
        Self {
            min_images_on_create: DEFAULT_MIN_IMAGES_ON_CREATE,
            max_images_per_request: DEFAULT_MAX_IMAGES_PER_REQUEST,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl CatalogRules {
    /// Configured limits may tighten the defaults but never drop below
    /// the minimum photo count a listing needs
    pub fn check(&self) -> Result<()> {
        if self.min_images_on_create < DEFAULT_MIN_IMAGES_ON_CREATE {
            anyhow::bail!(
                "MIN_IMAGES_ON_CREATE ({}) is below the required minimum of {}",
                self.min_images_on_create,
                DEFAULT_MIN_IMAGES_ON_CREATE
            );
        }
        if self.min_images_on_create > self.max_images_per_request {
            anyhow::bail!(
                "MIN_IMAGES_ON_CREATE ({}) exceeds MAX_IMAGES_PER_REQUEST ({})",
                self.min_images_on_create,
                self.max_images_per_request
            );
        }
        Ok(())
    }
}

/// Storage layout
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub rules: CatalogRules,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            uploads_dir: PathBuf::from("uploads"),
            rules: CatalogRules::default(),
        }
    }
}

impl StorageConfig {
    /// Read from `DATA_DIR`, `UPLOADS_DIR`, `MAX_IMAGE_BYTES`,
    /// `MIN_IMAGES_ON_CREATE` and `MAX_IMAGES_PER_REQUEST`
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let uploads_dir = std::env::var("UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.uploads_dir);

        let rules = CatalogRules {
            min_images_on_create: env_usize("MIN_IMAGES_ON_CREATE", DEFAULT_MIN_IMAGES_ON_CREATE)?,
            max_images_per_request: env_usize(
                "MAX_IMAGES_PER_REQUEST",
                DEFAULT_MAX_IMAGES_PER_REQUEST,
            )?,
            max_image_bytes: env_usize("MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
        };

        rules.check()?;

        Ok(Self {
            data_dir,
            uploads_dir,
            rules,
        })
    }

    /// Path of the serialized vehicle collection
    pub fn document_path(&self) -> PathBuf {
        self.data_dir.join(DOCUMENT_FILE_NAME)
    }

    /// Largest request body accepted: a full batch of images plus form overhead
    pub fn max_request_bytes(&self) -> usize {
        self.rules
            .max_images_per_request
            .saturating_mul(self.rules.max_image_bytes)
            .saturating_add(1024 * 1024)
    }
}

fn env_usize(key: &str, default: usize) -> Result<usize> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("parse {key}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lives_in_data_dir() {
        let config = StorageConfig {
            data_dir: PathBuf::from("/var/lib/catalog"),
            ..StorageConfig::default()
        };
        assert_eq!(
            config.document_path(),
            PathBuf::from("/var/lib/catalog/vehicles.json")
        );
    }

    #[test]
    fn request_limit_covers_a_full_batch() {
        let config = StorageConfig::default();
        assert_eq!(
            config.max_request_bytes(),
            10 * 5 * 1024 * 1024 + 1024 * 1024
        );
    }

    #[test]
    fn photo_minimum_cannot_be_lowered() {
        assert!(CatalogRules::default().check().is_ok());

        let lowered = CatalogRules {
            min_images_on_create: 2,
            ..CatalogRules::default()
        };
        let err = lowered.check().unwrap_err();
        assert!(err.to_string().contains("below the required minimum"));

        let raised = CatalogRules {
            min_images_on_create: 7,
            ..CatalogRules::default()
        };
        assert!(raised.check().is_ok());
    }

    #[test]
    fn minimum_above_batch_size_is_rejected() {
        let rules = CatalogRules {
            min_images_on_create: 8,
            max_images_per_request: 6,
            ..CatalogRules::default()
        };
        assert!(rules.check().is_err());
    }
}
