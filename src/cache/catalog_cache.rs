//! Catalog cache entry and its storage
//!
//! One entry per consumer: the last vehicle list that was shown, with the
//! time it was saved. Storage failures never reach the caller as errors of
//! the catalog load; the controller logs them and behaves as if no entry
//! existed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::sync::RwLock;

use crate::models::VehicleRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub data: Vec<VehicleRecord>,
    pub saved_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(data: Vec<VehicleRecord>, saved_at: DateTime<Utc>) -> Self {
        Self { data, saved_at }
    }

    /// Age at `now`; an entry stamped in the future counts as brand new
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.saved_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Usable while `now - saved_at < max_age`
    pub fn is_fresh_at(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.age_at(now) < max_age
    }
}

#[async_trait]
pub trait CacheStorage: Send + Sync {
    async fn read(&self) -> Result<Option<CacheEntry>>;
    async fn write(&self, entry: &CacheEntry) -> Result<()>;
    fn backend_name(&self) -> &'static str;
}

/// Entry kept as a JSON file
#[derive(Debug, Clone)]
pub struct FileCacheStorage {
    path: PathBuf,
}

impl FileCacheStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CacheStorage for FileCacheStorage {
    async fn read(&self) -> Result<Option<CacheEntry>> {
        if !fs::try_exists(&self.path).await? {
            return Ok(None);
        }
        let raw = fs::read(&self.path)
            .await
            .with_context(|| format!("read {}", self.path.display()))?;
        let entry = serde_json::from_slice(&raw)
            .with_context(|| format!("parse {}", self.path.display()))?;
        Ok(Some(entry))
    }

    async fn write(&self, entry: &CacheEntry) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let serialized = serde_json::to_vec(entry)?;
        fs::write(&self.path, serialized)
            .await
            .with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

/// Entry kept in process memory
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    entry: RwLock<Option<CacheEntry>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(entry: CacheEntry) -> Self {
        Self {
            entry: RwLock::new(Some(entry)),
        }
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn read(&self) -> Result<Option<CacheEntry>> {
        Ok(self.entry.read().await.clone())
    }

    async fn write(&self, entry: &CacheEntry) -> Result<()> {
        *self.entry.write().await = Some(entry.clone());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn freshness_is_strictly_below_max_age() {
        let now = Utc::now();
        let entry = |minutes| CacheEntry::new(vec![], now - ChronoDuration::minutes(minutes));

        assert!(entry(30).is_fresh_at(now, HOUR));
        assert!(entry(59).is_fresh_at(now, HOUR));
        assert!(!entry(60).is_fresh_at(now, HOUR));
        assert!(!entry(90).is_fresh_at(now, HOUR));
    }

    #[test]
    fn future_entries_count_as_fresh() {
        let now = Utc::now();
        let entry = CacheEntry::new(vec![], now + ChronoDuration::minutes(5));
        assert_eq!(entry.age_at(now), Duration::ZERO);
        assert!(entry.is_fresh_at(now, HOUR));
    }

    #[test]
    fn entry_uses_camel_case_on_disk() {
        let entry = CacheEntry::new(vec![], Utc::now());
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("savedAt").is_some());
        assert!(json.get("data").is_some());
    }

    #[tokio::test]
    async fn file_storage_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileCacheStorage::new(dir.path().join("nested").join("cache.json"));

        assert_eq!(storage.read().await.unwrap(), None);

        let entry = CacheEntry::new(vec![], Utc::now());
        storage.write(&entry).await.unwrap();
        assert_eq!(storage.read().await.unwrap(), Some(entry));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(FileCacheStorage::new(&path).read().await.is_err());
    }

    #[tokio::test]
    async fn memory_storage_overwrites() {
        let storage = MemoryCacheStorage::new();
        let first = CacheEntry::new(vec![], Utc::now() - ChronoDuration::minutes(10));
        let second = CacheEntry::new(vec![], Utc::now());

        storage.write(&first).await.unwrap();
        storage.write(&second).await.unwrap();

        assert_eq!(storage.read().await.unwrap(), Some(second));
    }
}
