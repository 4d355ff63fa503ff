//! In-memory catalog document, for tests and throwaway instances.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::VehicleDocument;
use crate::models::VehicleRecord;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, Default)]
pub struct MemoryDocument {
    records: RwLock<Vec<VehicleRecord>>,
    fail_writes: std::sync::atomic::AtomicBool,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `replace` fail with a storage error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

#[async_trait]
impl VehicleDocument for MemoryDocument {
    async fn initialize(&self) -> AppResult<()> {
        Ok(())
    }

    async fn load(&self) -> AppResult<Vec<VehicleRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn replace(&self, records: &[VehicleRecord]) -> AppResult<()> {
        if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(AppError::Storage("memory document is read-only".to_string()));
        }
        *self.records.write().await = records.to_vec();
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
