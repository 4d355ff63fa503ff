//! Wire shapes
//!
//! Request and response bodies for the catalog HTTP API.

pub mod common_dto;
pub mod vehicle_dto;

pub use common_dto::ApiResponse;
pub use vehicle_dto::*;
