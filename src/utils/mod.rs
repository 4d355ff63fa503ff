//! System utilities
//!
//! Error handling and input validation helpers shared by every layer.

pub mod errors;
pub mod validation;

pub use errors::{AppError, AppResult};
