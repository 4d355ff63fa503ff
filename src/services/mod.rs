//! Services
//!
//! Business logic that does not own state.

pub mod vehicle_query;

pub use vehicle_query::{query, QueryPage, SortKey, VehicleQuery, ALL_TYPES, DEFAULT_LIMIT, DEFAULT_PAGE};
