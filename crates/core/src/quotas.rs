//! Account Quotas
//!
//! The quota reader returns one flat row per joined redemption. Aggregation
//! folds those rows into one [`AggregatedQuota`] per
//! `(account, siebel account, threshold)` group, counting the rows that carry
//! a redeemer.

use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer, ser::SerializeSeq};

use crate::{accounts::AccountId, identity::CustomerUuid};

/// One row of the raw quota join.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuotaRow {
    /// Account credited by the e-stamp reward
    pub account_id: Option<AccountId>,

    /// Secondary (CRM) account identifier of the tier
    pub siebel_acct_id: Option<String>,

    /// Tier threshold
    pub threshold: Option<u32>,

    /// Set when the joined redemption was made by the evaluated customer
    pub redeemer: Option<CustomerUuid>,
}

/// Grouping key of an aggregated quota.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuotaKey {
    /// Account identifier
    pub account_id: AccountId,

    /// Secondary (CRM) account identifier
    pub siebel_acct_id: String,

    /// Tier threshold
    pub threshold: u32,
}

impl QuotaKey {
    fn from_row(row: &RawQuotaRow) -> Self {
        Self {
            account_id: row.account_id.clone().unwrap_or_default(),
            siebel_acct_id: row.siebel_acct_id.clone().unwrap_or_default(),
            threshold: row.threshold.unwrap_or_default(),
        }
    }
}

/// Quota usage of one account group by one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedQuota {
    /// Account identifier
    pub account_id: AccountId,

    /// Secondary (CRM) account identifier
    pub siebel_acct_id: String,

    /// Redemptions allowed before the quota is used up
    pub threshold: u32,

    /// Redemptions attributed to the customer
    pub ordered_amt: u32,
}

impl AggregatedQuota {
    /// Redemptions left before the threshold is reached; never negative.
    pub fn remaining_quota(&self) -> u32 {
        self.threshold.saturating_sub(self.ordered_amt)
    }

    /// Whether the customer has used up this quota.
    pub fn is_exhausted(&self) -> bool {
        self.ordered_amt >= self.threshold
    }
}

/// Aggregated quotas in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountQuotas {
    entries: Vec<AggregatedQuota>,
    index: FxHashMap<QuotaKey, usize>,
}

impl AccountQuotas {
    /// Number of quota groups.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no quota groups.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate quota groups in the order they were first seen.
    pub fn iter(&self) -> impl Iterator<Item = &AggregatedQuota> {
        self.entries.iter()
    }

    /// Look up a quota group by its full key.
    pub fn get(&self, key: &QuotaKey) -> Option<&AggregatedQuota> {
        self.index.get(key).and_then(|&idx| self.entries.get(idx))
    }

    /// First quota group recorded for `account_id`.
    pub fn for_account(&self, account_id: &AccountId) -> Option<&AggregatedQuota> {
        self.entries
            .iter()
            .find(|quota| &quota.account_id == account_id)
    }

    fn record(&mut self, row: &RawQuotaRow) {
        let key = QuotaKey::from_row(row);
        let redeemed = u32::from(row.redeemer.is_some());

        if let Some(quota) = self
            .index
            .get(&key)
            .and_then(|&idx| self.entries.get_mut(idx))
        {
            quota.ordered_amt = quota.ordered_amt.saturating_add(redeemed);
            return;
        }

        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(AggregatedQuota {
            account_id: key.account_id,
            siebel_acct_id: key.siebel_acct_id,
            threshold: key.threshold,
            ordered_amt: redeemed,
        });
    }
}

impl<'a> IntoIterator for &'a AccountQuotas {
    type Item = &'a AggregatedQuota;
    type IntoIter = std::slice::Iter<'a, AggregatedQuota>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for AccountQuotas {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;

        for quota in &self.entries {
            seq.serialize_element(quota)?;
        }

        seq.end()
    }
}

/// Fold raw quota rows into per-group quotas in a single pass.
pub fn aggregate<'a, I>(rows: I) -> AccountQuotas
where
    I: IntoIterator<Item = &'a RawQuotaRow>,
{
    let mut quotas = AccountQuotas::default();

    for row in rows {
        quotas.record(row);
    }

    quotas
}
