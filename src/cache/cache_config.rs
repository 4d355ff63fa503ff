//! Cache configuration

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::catalog_cache::{CacheStorage, FileCacheStorage, MemoryCacheStorage};
use crate::services::DEFAULT_LIMIT;

/// Client cache settings
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Server root the catalog is fetched from
    pub api_base: String,
    /// Entries at least this old are never served
    pub max_age: Duration,
    pub fetch_timeout: Duration,
    pub page_limit: u64,
    /// File holding the cache entry; in-memory when unset
    pub cache_path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:10000".to_string(),
            max_age: Duration::from_secs(60 * 60), // 1 hour
            fetch_timeout: Duration::from_secs(5),
            page_limit: DEFAULT_LIMIT,
            cache_path: None,
        }
    }
}

impl CacheConfig {
    /// Read `CATALOG_API_BASE`, `CATALOG_CACHE_MAX_AGE_SECS`,
    /// `CATALOG_FETCH_TIMEOUT_SECS`, `CATALOG_PAGE_LIMIT` and `CATALOG_CACHE_PATH`
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let secs = |name: &str, default: Duration| -> Result<Duration> {
            match env::var(name) {
                Ok(raw) => Ok(Duration::from_secs(
                    raw.trim().parse().with_context(|| format!("parse {}", name))?,
                )),
                Err(_) => Ok(default),
            }
        };

        let page_limit = match env::var("CATALOG_PAGE_LIMIT") {
            Ok(raw) => raw.trim().parse().with_context(|| "parse CATALOG_PAGE_LIMIT")?,
            Err(_) => defaults.page_limit,
        };
        if page_limit == 0 {
            anyhow::bail!("CATALOG_PAGE_LIMIT must be at least 1");
        }

        Ok(Self {
            api_base: env::var("CATALOG_API_BASE").unwrap_or(defaults.api_base),
            max_age: secs("CATALOG_CACHE_MAX_AGE_SECS", defaults.max_age)?,
            fetch_timeout: secs("CATALOG_FETCH_TIMEOUT_SECS", defaults.fetch_timeout)?,
            page_limit,
            cache_path: env::var("CATALOG_CACHE_PATH").ok().map(PathBuf::from),
        })
    }

    /// Storage named by `cache_path`
    pub fn open_storage(&self) -> Arc<dyn CacheStorage> {
        match &self.cache_path {
            Some(path) => Arc::new(FileCacheStorage::new(path)),
            None => Arc::new(MemoryCacheStorage::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_storefront() {
        let config = CacheConfig::default();
        assert_eq!(config.max_age, Duration::from_secs(3600));
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.page_limit, 6);
    }

    #[test]
    fn storage_follows_cache_path() {
        assert_eq!(CacheConfig::default().open_storage().backend_name(), "memory");

        let config = CacheConfig {
            cache_path: Some(PathBuf::from("catalog-cache.json")),
            ..CacheConfig::default()
        };
        assert_eq!(config.open_storage().backend_name(), "file");
    }
}
