//! Cleanup errors.

use thiserror::Error;

use crate::domain::promotions::PromotionsServiceError;

#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("promotion cleanup failed")]
    Promotions(#[from] PromotionsServiceError),
}
