//! Redemptions errors.

use thiserror::Error;

use crate::domain::{promotions::PromotionsServiceError, tiers::TiersServiceError};

#[derive(Debug, Error)]
pub enum RedemptionsError {
    #[error("failed to resolve the redeemed promotion")]
    Promotions(#[from] PromotionsServiceError),

    #[error("failed to update e-stamp tiers")]
    Tiers(#[from] TiersServiceError),
}
