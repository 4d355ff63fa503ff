//! JSON file backend
//!
//! The whole collection lives in one pretty-printed JSON array. Writes go to a
//! sibling temporary file that is then renamed over the document, so a reader
//! never observes a half-written collection.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::VehicleDocument;
use crate::models::VehicleRecord;
use crate::utils::errors::AppResult;

#[derive(Debug, Clone)]
pub struct JsonFileDocument {
    path: PathBuf,
}

impl JsonFileDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "vehicles.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl VehicleDocument for JsonFileDocument {
    async fn initialize(&self) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        if !fs::try_exists(&self.path).await? {
            info!("📁 Creating empty catalog document at {}", self.path.display());
            fs::write(&self.path, b"[]").await?;
        }
        Ok(())
    }

    async fn load(&self) -> AppResult<Vec<VehicleRecord>> {
        let raw = fs::read(&self.path).await?;
        let records: Vec<VehicleRecord> = serde_json::from_slice(&raw)?;
        debug!("📖 Loaded {} vehicles from {}", records.len(), self.path.display());
        Ok(records)
    }

    async fn replace(&self, records: &[VehicleRecord]) -> AppResult<()> {
        let serialized = serde_json::to_vec_pretty(records)?;
        let temp = self.temp_path();
        fs::write(&temp, &serialized).await?;
        fs::rename(&temp, &self.path).await?;
        debug!("💾 Persisted {} vehicles to {}", records.len(), self.path.display());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "json-file"
    }
}
