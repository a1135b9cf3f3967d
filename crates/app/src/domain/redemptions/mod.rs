//! Coupon Redemptions

pub mod data;
pub mod errors;
pub mod service;

pub use errors::RedemptionsError;
pub use service::*;
