//! Shared application state
//!
//! Everything the axum handlers need, cloned cheaply into each request.

use std::sync::Arc;
use tracing::info;

use crate::config::environment::EnvironmentConfig;
use crate::database::{JsonFileDocument, VehicleDocument};
use crate::repositories::{AssetStore, VehicleRepository};
use crate::utils::errors::AppResult;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub vehicles: Arc<VehicleRepository>,
}

impl AppState {
    pub fn new(config: EnvironmentConfig, vehicles: VehicleRepository) -> Self {
        Self {
            config: Arc::new(config),
            vehicles: Arc::new(vehicles),
        }
    }

    /// Open the JSON document and upload directory named by the configuration
    pub async fn from_config(config: EnvironmentConfig) -> AppResult<Self> {
        let storage = &config.storage;
        let document: Arc<dyn VehicleDocument> =
            Arc::new(JsonFileDocument::new(storage.document_path()));
        let assets = Arc::new(
            AssetStore::open(&storage.uploads_dir, storage.rules.max_image_bytes).await?,
        );
        let vehicles = VehicleRepository::open(document, assets, storage.rules).await?;

        info!(
            "📦 Catalog state ready (data: {}, uploads: {})",
            storage.data_dir.display(),
            storage.uploads_dir.display()
        );
        Ok(Self::new(config, vehicles))
    }
}
