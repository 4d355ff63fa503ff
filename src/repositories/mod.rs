//! Repositories
//!
//! The record store for vehicles and the asset store for their photos.

pub mod asset_store;
pub mod vehicle_repository;

pub use asset_store::{AssetCleanup, AssetDeletion, AssetFailure, AssetStore};
pub use vehicle_repository::{ImageRemoval, VehicleDeletion, VehicleRepository};
