//! E-Stamp Tiers
//!
//! A tier is a per-account stamp counter capped at a maximum. Counts only move
//! through [`StampTier::increment`], which saturates at the cap, and
//! [`StampTier::reset`].

use serde::{Deserialize, Serialize};

use crate::accounts::AccountId;

/// E-stamp tier of a member account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampTier {
    account_id: AccountId,
    siebel_acct_id: String,
    threshold: u32,
    level: u32,
    current_count: u32,
    max_count: u32,
}

impl StampTier {
    /// Create a tier. A `current_count` above `max_count` is clamped to the cap.
    pub fn new(
        account_id: AccountId,
        siebel_acct_id: impl Into<String>,
        threshold: u32,
        level: u32,
        current_count: u32,
        max_count: u32,
    ) -> Self {
        Self {
            account_id,
            siebel_acct_id: siebel_acct_id.into(),
            threshold,
            level,
            current_count: current_count.min(max_count),
            max_count,
        }
    }

    /// Account identifier
    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Secondary (CRM) account identifier
    pub fn siebel_acct_id(&self) -> &str {
        &self.siebel_acct_id
    }

    /// Redemptions needed before the account's quota is used up
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Tier level
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Current stamp count
    pub fn current_count(&self) -> u32 {
        self.current_count
    }

    /// Stamp cap
    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    /// Whether more stamps can still be collected.
    pub fn is_open(&self) -> bool {
        self.current_count < self.max_count
    }

    /// Add `amount` stamps, saturating at the cap. Returns the new count.
    pub fn increment(&mut self, amount: u32) -> u32 {
        self.current_count = self
            .current_count
            .saturating_add(amount)
            .min(self.max_count);

        self.current_count
    }

    /// Clear the stamp count.
    pub fn reset(&mut self) {
        self.current_count = 0;
    }
}
