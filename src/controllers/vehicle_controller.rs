//! Vehicle controller
//!
//! Request-level orchestration on top of the record store: image count
//! checks, upload validation and storage, and removal of freshly stored
//! uploads when the record change that would have referenced them fails.

use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::dto::common_dto::ApiResponse;
use crate::dto::vehicle_dto::{DeleteVehicleResponse, VehicleForm};
use crate::models::{ImageUpload, VehicleId, VehicleRecord};
use crate::repositories::{ImageRemoval, VehicleRepository};
use crate::services::{query, QueryPage, VehicleQuery};
use crate::utils::errors::{validation_error, AppResult};

pub struct VehicleController {
    repository: Arc<VehicleRepository>,
}

impl VehicleController {
    pub fn new(repository: Arc<VehicleRepository>) -> Self {
        Self { repository }
    }

    /// Filtered, sorted and paginated public listing
    pub async fn list(&self, params: &VehicleQuery) -> QueryPage<VehicleRecord> {
        let snapshot = self.repository.list().await;
        query(&snapshot, params)
    }

    /// Every vehicle, unfiltered, in stored order
    pub async fn list_all(&self) -> Vec<VehicleRecord> {
        self.repository.list().await.as_ref().clone()
    }

    /// Re-read the stored document and return the new snapshot
    pub async fn reload(&self) -> AppResult<Vec<VehicleRecord>> {
        let count = self.repository.reload().await?;
        info!("🔄 Catalog reloaded from storage: {} vehicles", count);
        Ok(self.list_all().await)
    }

    pub async fn get_by_id(&self, id: VehicleId) -> AppResult<VehicleRecord> {
        self.repository.get(id).await
    }

    pub async fn create(
        &self,
        form: VehicleForm,
        uploads: Vec<ImageUpload>,
    ) -> AppResult<ApiResponse<VehicleRecord>> {
        let rules = self.repository.rules();
        if uploads.len() < rules.min_images_on_create {
            return Err(validation_error(format!(
                "At least {} photos of the vehicle are required",
                rules.min_images_on_create
            )));
        }
        self.check_upload_count(uploads.len())?;

        let draft = form.into_draft()?;
        draft.validate()?;

        let image_refs = self.store_uploads(&uploads).await?;
        match self.repository.create(draft, image_refs.clone()).await {
            Ok(vehicle) => Ok(ApiResponse::success_with_message(
                vehicle,
                "Vehicle created successfully",
            )),
            Err(e) => {
                self.discard_uploads(&image_refs).await;
                Err(e)
            }
        }
    }

    pub async fn update(
        &self,
        id: VehicleId,
        form: VehicleForm,
        uploads: Vec<ImageUpload>,
    ) -> AppResult<ApiResponse<VehicleRecord>> {
        self.check_upload_count(uploads.len())?;

        let patch = form.into_patch()?;
        patch.validate()?;

        // Fail fast on unknown ids so no file is written for them
        self.repository.get(id).await?;

        let image_refs = self.store_uploads(&uploads).await?;
        match self.repository.update(id, patch, image_refs.clone()).await {
            Ok(vehicle) => Ok(ApiResponse::success_with_message(
                vehicle,
                "Vehicle updated successfully",
            )),
            Err(e) => {
                self.discard_uploads(&image_refs).await;
                Err(e)
            }
        }
    }

    pub async fn delete_image(
        &self,
        id: VehicleId,
        image_ref: Option<String>,
    ) -> AppResult<ApiResponse<VehicleRecord>> {
        let ImageRemoval { vehicle, cleanup } = self
            .repository
            .delete_image(id, image_ref.as_deref().unwrap_or(""))
            .await?;

        let message = if cleanup.is_clean() {
            "Image deleted successfully".to_string()
        } else {
            format!(
                "Image detached but its file could not be removed: {}",
                cleanup.failures[0].reason
            )
        };
        Ok(ApiResponse::success_with_message(vehicle, message))
    }

    pub async fn delete(&self, id: VehicleId) -> AppResult<DeleteVehicleResponse> {
        let deletion = self.repository.delete(id).await?;

        Ok(DeleteVehicleResponse {
            success: true,
            message: "Vehicle deleted successfully".to_string(),
            deleted_id: deletion.deleted_id,
            asset_failures: deletion.cleanup.failures,
        })
    }

    fn check_upload_count(&self, count: usize) -> AppResult<()> {
        let max = self.repository.rules().max_images_per_request;
        if count > max {
            return Err(validation_error(format!(
                "At most {} images can be uploaded per request",
                max
            )));
        }
        Ok(())
    }

    /// Validate every upload first, then write them; a failed write removes
    /// the ones already written
    async fn store_uploads(&self, uploads: &[ImageUpload]) -> AppResult<Vec<String>> {
        let assets = self.repository.assets();
        for upload in uploads {
            assets.validate(upload)?;
        }

        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match assets.store(upload).await {
                Ok(asset_ref) => stored.push(asset_ref),
                Err(e) => {
                    self.discard_uploads(&stored).await;
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }

    async fn discard_uploads(&self, image_refs: &[String]) {
        if image_refs.is_empty() {
            return;
        }
        let cleanup = self.repository.assets().delete_all(image_refs).await;
        if cleanup.is_clean() {
            info!("🧹 Discarded {} unreferenced upload(s)", cleanup.removed.len());
        } else {
            warn!(
                "⚠️ {} unreferenced upload(s) could not be discarded",
                cleanup.failures.len()
            );
        }
    }
}
