//! Estamp Domain Concerns

pub mod cleanup;
pub mod eligibility;
pub mod promotions;
pub mod quotas;
pub mod redemptions;
pub mod rewards;
pub mod tiers;

mod columns;
