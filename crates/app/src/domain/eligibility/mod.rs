//! Promotion Eligibility

pub mod errors;
pub mod service;

pub use errors::EligibilityError;
pub use service::*;
