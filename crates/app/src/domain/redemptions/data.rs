//! Redemptions Data

use estamp::{
    accounts::AccountId,
    identity::{CustomerUuid, RedemptionUuid},
    promotions::PromotionUuid,
    tiers::StampTier,
};

/// A coupon redemption reported by the commerce platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedemptionEvent {
    pub redemption: RedemptionUuid,
    pub promotion: PromotionUuid,
    pub customer: CustomerUuid,
}

/// Result of reacting to a redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedemptionOutcome {
    /// Unknown promotion, or a promotion with no e-stamp rewards.
    Skipped,

    /// The redemption was already applied.
    Duplicate,

    /// Tier increments were applied.
    Applied {
        incremented: Vec<StampTier>,
        missing: Vec<AccountId>,
    },
}
