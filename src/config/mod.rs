//! Project configuration
//!
//! Server environment settings and the storage layout / catalog rules.

pub mod environment;
pub mod storage;

pub use environment::*;
pub use storage::*;
