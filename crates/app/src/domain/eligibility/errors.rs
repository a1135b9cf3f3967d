//! Eligibility errors.

use thiserror::Error;

use crate::domain::{promotions::PromotionsServiceError, quotas::QuotaServiceError};

#[derive(Debug, Error)]
pub enum EligibilityError {
    #[error("failed to load account quotas")]
    Quotas(#[from] QuotaServiceError),

    #[error("failed to load candidate promotions")]
    Promotions(#[from] PromotionsServiceError),
}
