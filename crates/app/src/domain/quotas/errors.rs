//! Quota service errors.

use std::num::TryFromIntError;

use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuotaServiceError {
    #[error("redemption count out of range")]
    CountOutOfRange(#[from] TryFromIntError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for QuotaServiceError {
    fn from(error: Error) -> Self {
        Self::Sql(error)
    }
}
