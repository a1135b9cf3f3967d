//! Rewards

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Deserialize;
use smallvec::SmallVec;

use crate::{accounts::AccountId, promotions::PromotionUuid, uuids::TypedUuid};

/// Stored code for [`RewardType::IncreaseMemberAccount`].
pub const INCREASE_MEMBER_ACCOUNT: &str = "increase_member_account";

/// Stamps credited when a reward does not carry an explicit value.
pub const DEFAULT_STAMP_INCREMENT: u32 = 1;

/// Reward UUID
pub type RewardUuid = TypedUuid<Reward>;

/// Reward Type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum RewardType {
    /// Credits stamps to a member account's e-stamp tier.
    IncreaseMemberAccount,

    /// Any other reward kind. These never participate in e-stamp evaluation.
    Other(String),
}

impl RewardType {
    /// Parse a stored reward type code.
    pub fn from_code(code: &str) -> Self {
        if code == INCREASE_MEMBER_ACCOUNT {
            Self::IncreaseMemberAccount
        } else {
            Self::Other(code.to_owned())
        }
    }

    /// Return the stored code for this reward type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::IncreaseMemberAccount => INCREASE_MEMBER_ACCOUNT,
            Self::Other(code) => code,
        }
    }
}

impl From<String> for RewardType {
    fn from(value: String) -> Self {
        Self::from_code(&value)
    }
}

impl Display for RewardType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Reward granted by a promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reward {
    /// Reward identifier
    pub uuid: RewardUuid,

    /// Owning promotion
    pub promotion: PromotionUuid,

    /// Reward type
    pub kind: RewardType,

    /// Member account credited by this reward
    pub account_id: Option<AccountId>,

    /// Numeric reward value; for e-stamp rewards this is the increment amount.
    pub value: Option<u32>,
}

impl Reward {
    /// The account this reward stamps, if it is an e-stamp reward with a target.
    pub fn stamp_account(&self) -> Option<&AccountId> {
        match self.kind {
            RewardType::IncreaseMemberAccount => self.account_id.as_ref(),
            RewardType::Other(_) => None,
        }
    }

    /// Stamps credited per redemption.
    pub fn increment_amount(&self) -> u32 {
        self.value.unwrap_or(DEFAULT_STAMP_INCREMENT)
    }
}

/// A pending increment of one account's stamp count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierIncrement {
    /// Account to credit
    pub account_id: AccountId,

    /// Stamps to add
    pub amount: u32,
}

/// Collect the tier increments a redemption of a promotion with these rewards
/// should apply. Rewards of other types, or without a target account, are
/// skipped.
pub fn stamp_increments(rewards: &[Reward]) -> SmallVec<[TierIncrement; 4]> {
    rewards
        .iter()
        .filter_map(|reward| {
            reward.stamp_account().map(|account_id| TierIncrement {
                account_id: account_id.clone(),
                amount: reward.increment_amount(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reward(kind: RewardType, account: Option<&str>, value: Option<u32>) -> Reward {
        Reward {
            uuid: RewardUuid::new(),
            promotion: PromotionUuid::new(),
            kind,
            account_id: account.map(AccountId::from),
            value,
        }
    }

    #[test]
    fn reward_type_codes_round_trip_through_storage() {
        assert_eq!(
            RewardType::from_code("increase_member_account"),
            RewardType::IncreaseMemberAccount
        );

        assert_eq!(
            RewardType::from_code("points"),
            RewardType::Other("points".to_string())
        );

        assert_eq!(RewardType::Other("points".to_string()).as_str(), "points");
    }

    #[test]
    fn increment_amount_defaults_to_one() {
        let reward = reward(RewardType::IncreaseMemberAccount, Some("ACCT_1"), None);

        assert_eq!(reward.increment_amount(), 1);
    }

    #[test]
    fn stamp_increments_skip_other_types_and_missing_accounts() {
        let rewards = [
            reward(RewardType::IncreaseMemberAccount, Some("ACCT_1"), Some(3)),
            reward(RewardType::IncreaseMemberAccount, None, Some(5)),
            reward(RewardType::Other("points".into()), Some("ACCT_2"), Some(7)),
            reward(RewardType::IncreaseMemberAccount, Some("ACCT_3"), None),
        ];

        let increments = stamp_increments(&rewards);

        assert_eq!(
            increments.as_slice(),
            &[
                TierIncrement {
                    account_id: AccountId::from("ACCT_1"),
                    amount: 3,
                },
                TierIncrement {
                    account_id: AccountId::from("ACCT_3"),
                    amount: 1,
                },
            ]
        );
    }

    #[test]
    fn stamp_increments_of_no_rewards_is_empty() {
        assert!(stamp_increments(&[]).is_empty());
    }
}
