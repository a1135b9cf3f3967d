//! Account Quotas

pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::QuotaServiceError;
pub use service::*;
