//! Vehicle record store
//!
//! Owns the vehicle collection. Every mutation is a read-modify-write of the
//! whole document performed inside one exclusive writer section per store, so
//! two concurrent mutations can never both start from the same snapshot.
//! Reads never take the writer section: they clone the `Arc` of the last
//! committed snapshot.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use validator::Validate;

use crate::config::CatalogRules;
use crate::database::VehicleDocument;
use crate::models::{VehicleDraft, VehicleId, VehiclePatch, VehicleRecord};
use crate::repositories::asset_store::{AssetCleanup, AssetStore};
use crate::utils::errors::{validation_error, vehicle_not_found, AppError, AppResult};

/// Result of removing one image from a vehicle
#[derive(Debug, Clone, Serialize)]
pub struct ImageRemoval {
    pub vehicle: VehicleRecord,
    pub cleanup: AssetCleanup,
}

/// Result of deleting a vehicle and its images
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDeletion {
    pub deleted_id: VehicleId,
    pub cleanup: AssetCleanup,
}

pub struct VehicleRepository {
    document: Arc<dyn VehicleDocument>,
    assets: Arc<AssetStore>,
    rules: CatalogRules,
    snapshot: RwLock<Arc<Vec<VehicleRecord>>>,
    writer: Mutex<()>,
}

impl VehicleRepository {
    /// Initialize the backing document and load the first snapshot
    pub async fn open(
        document: Arc<dyn VehicleDocument>,
        assets: Arc<AssetStore>,
        rules: CatalogRules,
    ) -> AppResult<Self> {
        document.initialize().await?;
        let records = document.load().await?;
        info!(
            "🚗 Vehicle store opened on {} backend with {} vehicles",
            document.backend_name(),
            records.len()
        );

        Ok(Self {
            document,
            assets,
            rules,
            snapshot: RwLock::new(Arc::new(records)),
            writer: Mutex::new(()),
        })
    }

    pub fn assets(&self) -> &Arc<AssetStore> {
        &self.assets
    }

    pub fn rules(&self) -> CatalogRules {
        self.rules
    }

    pub fn backend_name(&self) -> &'static str {
        self.document.backend_name()
    }

    /// Full snapshot of the collection, in stored order
    pub async fn list(&self) -> Arc<Vec<VehicleRecord>> {
        self.snapshot.read().await.clone()
    }

    pub async fn get(&self, id: VehicleId) -> AppResult<VehicleRecord> {
        self.list()
            .await
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or_else(|| vehicle_not_found(id))
    }

    /// Re-read the backing document into the snapshot
    pub async fn reload(&self) -> AppResult<usize> {
        let _guard = self.writer.lock().await;
        let records = self.document.load().await?;
        let count = records.len();
        *self.snapshot.write().await = Arc::new(records);
        Ok(count)
    }

    /// Create a vehicle from already stored images
    pub async fn create(
        &self,
        draft: VehicleDraft,
        image_refs: Vec<String>,
    ) -> AppResult<VehicleRecord> {
        if image_refs.len() < self.rules.min_images_on_create {
            return Err(validation_error(format!(
                "At least {} photos of the vehicle are required",
                self.rules.min_images_on_create
            )));
        }
        draft.validate()?;

        let _guard = self.writer.lock().await;
        let mut records = self.document.load().await?;

        let id = records.iter().map(|v| v.id).max().unwrap_or(0) + 1;
        let vehicle = VehicleRecord::from_draft(id, draft, image_refs, Utc::now());
        records.push(vehicle.clone());

        self.commit(records).await?;
        info!(
            "✅ Vehicle {} created with {} photos",
            vehicle.id,
            vehicle.images.len()
        );
        Ok(vehicle)
    }

    /// Merge supplied fields and append new images
    pub async fn update(
        &self,
        id: VehicleId,
        patch: VehiclePatch,
        new_image_refs: Vec<String>,
    ) -> AppResult<VehicleRecord> {
        patch.validate()?;

        let _guard = self.writer.lock().await;
        let mut records = self.document.load().await?;
        let vehicle = records
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| vehicle_not_found(id))?;

        vehicle.apply_patch(patch);
        vehicle.images.extend(new_image_refs);
        vehicle.updated_at = Utc::now();
        let updated = vehicle.clone();

        self.commit(records).await?;
        info!("✅ Vehicle {} updated", id);
        Ok(updated)
    }

    /// Detach one image from a vehicle and delete its file
    pub async fn delete_image(&self, id: VehicleId, image_ref: &str) -> AppResult<ImageRemoval> {
        let image_ref = image_ref.trim();
        if image_ref.is_empty() {
            return Err(validation_error("imagePath is required"));
        }

        let _guard = self.writer.lock().await;
        let mut records = self.document.load().await?;
        let vehicle = records
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| vehicle_not_found(id))?;

        let before = vehicle.images.len();
        vehicle.images.retain(|img| img != image_ref);
        if vehicle.images.len() == before {
            return Err(AppError::NotFound(format!(
                "Image '{}' is not attached to vehicle {}",
                image_ref, id
            )));
        }
        vehicle.updated_at = Utc::now();
        let updated = vehicle.clone();

        self.commit(records).await?;
        let cleanup = self.assets.delete_all(&[image_ref.to_string()]).await;
        info!("🗑️ Image {} removed from vehicle {}", image_ref, id);

        Ok(ImageRemoval {
            vehicle: updated,
            cleanup,
        })
    }

    /// Remove a vehicle, then every file it referenced
    pub async fn delete(&self, id: VehicleId) -> AppResult<VehicleDeletion> {
        let _guard = self.writer.lock().await;
        let mut records = self.document.load().await?;
        let index = records
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| vehicle_not_found(id))?;

        let removed = records.remove(index);
        self.commit(records).await?;

        let cleanup = self.assets.delete_all(&removed.images).await;
        if !cleanup.is_clean() {
            warn!(
                "⚠️ Vehicle {} deleted but {} image(s) could not be removed",
                id,
                cleanup.failures.len()
            );
        }
        info!("🗑️ Vehicle {} deleted", id);

        Ok(VehicleDeletion {
            deleted_id: id,
            cleanup,
        })
    }

    /// Persist the whole collection and publish it as the new snapshot.
    /// Callers must hold the writer section.
    async fn commit(&self, records: Vec<VehicleRecord>) -> AppResult<()> {
        self.document.replace(&records).await?;
        *self.snapshot.write().await = Arc::new(records);
        Ok(())
    }
}
