//! Tiers Data

use estamp::{accounts::AccountId, tiers::StampTier};

/// Result of applying a redemption's tier increments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedemptionApplication {
    /// The redemption was applied before; nothing changed.
    Duplicate,

    /// Increments were applied.
    Applied {
        /// Tiers after their increment, in account order
        incremented: Vec<StampTier>,

        /// Target accounts without a tier
        missing: Vec<AccountId>,
    },
}
