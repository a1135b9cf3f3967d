//! Promotions

pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::PromotionsServiceError;
pub use service::*;
