//! E-Stamp Tiers

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::TiersServiceError;
pub use service::*;
