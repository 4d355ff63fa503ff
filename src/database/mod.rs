//! Catalog document backends
//!
//! The vehicle collection is persisted as one serialized document that is
//! always read and replaced as a whole. `VehicleDocument` is the seam that
//! lets the record store run on a JSON file or purely in memory.

use async_trait::async_trait;

use crate::models::VehicleRecord;
use crate::utils::errors::AppResult;

pub mod json_document;
pub mod memory;

pub use json_document::JsonFileDocument;
pub use memory::MemoryDocument;

#[async_trait]
pub trait VehicleDocument: Send + Sync {
    /// Make sure the document exists; an absent document becomes an empty collection
    async fn initialize(&self) -> AppResult<()>;

    /// Read the full collection
    async fn load(&self) -> AppResult<Vec<VehicleRecord>>;

    /// Replace the full collection in a single operation
    async fn replace(&self, records: &[VehicleRecord]) -> AppResult<()>;

    fn backend_name(&self) -> &'static str;
}
