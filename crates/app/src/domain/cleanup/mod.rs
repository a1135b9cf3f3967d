//! Promotion Cleanup

pub mod errors;
pub mod service;

pub use errors::CleanupError;
pub use service::*;
