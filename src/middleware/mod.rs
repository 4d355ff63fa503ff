//! HTTP middleware
//!
//! CORS configuration for the catalog API.

pub mod cors;

pub use cors::*;
