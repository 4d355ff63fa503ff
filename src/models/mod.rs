//! Data models
//!
//! Vehicle listings and the inputs that create or change them.

pub mod vehicle;

pub use vehicle::*;
