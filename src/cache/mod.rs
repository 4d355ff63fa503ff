//! Client-side catalog cache
//!
//! Last-known catalog kept by consumers, and the live/offline controller that
//! falls back to it when the server cannot be reached.

pub mod cache_config;
pub mod catalog_cache;
pub mod fallback_controller;

pub use cache_config::CacheConfig;
pub use catalog_cache::{CacheEntry, CacheStorage, FileCacheStorage, MemoryCacheStorage};
pub use fallback_controller::{
    CatalogFilters, CatalogView, ConnectionState, FallbackController, FetchMode, LoadOutcome,
    RequestTicket,
};
