//! Promotion Eligibility
//!
//! A promotion is eligible for a customer when one of its e-stamp rewards
//! targets an account whose quota the customer has not used up, and the
//! customer is still under the promotion's per-user redemption limit.
//! Redemption counts live in the store, so [`decide`] only reports whether a
//! count is needed and [`evaluate`] asks the caller for it.

use serde::Deserialize;

use crate::{
    accounts::AccountId,
    promotions::{Promotion, PromotionUuid},
    quotas::AccountQuotas,
};

/// Default cap on the number of promotions returned by one evaluation.
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// How to treat a promotion with rewards but no matching account quota.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedRewardPolicy {
    /// Reject the promotion.
    #[default]
    Ineligible,

    /// Treat the promotion as tentatively eligible.
    Eligible,
}

/// Evaluation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationSettings {
    /// Maximum number of promotions returned
    pub max_results: usize,

    /// Reserved; evaluations are never cached
    pub cache_enabled: bool,

    /// Treatment of promotions whose rewards match no quota
    pub unmatched_rewards: UnmatchedRewardPolicy,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            cache_enabled: false,
            unmatched_rewards: UnmatchedRewardPolicy::default(),
        }
    }
}

/// Outcome of matching a promotion's rewards against the customer's quotas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaVerdict {
    /// The promotion grants nothing.
    NoRewards,

    /// A reward targets an account with quota left.
    Open {
        /// First account found with quota left
        account_id: AccountId,
    },

    /// Every matched account quota is used up.
    Exhausted,

    /// No e-stamp reward targets an account in the quotas.
    Unmatched,
}

/// Match a promotion's e-stamp rewards against aggregated quotas.
pub fn quota_verdict(promotion: &Promotion, quotas: &AccountQuotas) -> QuotaVerdict {
    if !promotion.has_rewards() {
        return QuotaVerdict::NoRewards;
    }

    let mut matched = false;

    for account_id in promotion.stamp_accounts() {
        for quota in quotas.iter().filter(|q| &q.account_id == account_id) {
            if !quota.is_exhausted() {
                return QuotaVerdict::Open {
                    account_id: account_id.clone(),
                };
            }

            matched = true;
        }
    }

    if matched {
        QuotaVerdict::Exhausted
    } else {
        QuotaVerdict::Unmatched
    }
}

/// Decision for one candidate promotion before redemption counts are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Reject the promotion.
    Ineligible,

    /// Accept the promotion.
    Eligible,

    /// Accept only if the customer's redemption count is below `limit`.
    CheckRedemptions {
        /// Per-user redemption limit
        limit: u32,
    },
}

/// Decide a candidate promotion from its quota verdict and redemption limits.
pub fn decide(
    promotion: &Promotion,
    quotas: &AccountQuotas,
    policy: UnmatchedRewardPolicy,
) -> Decision {
    let tentative = match quota_verdict(promotion, quotas) {
        QuotaVerdict::Open { .. } => true,
        QuotaVerdict::Unmatched => policy == UnmatchedRewardPolicy::Eligible,
        QuotaVerdict::NoRewards | QuotaVerdict::Exhausted => false,
    };

    if !tentative {
        return Decision::Ineligible;
    }

    match promotion.limits.per_user {
        Some(limit) => Decision::CheckRedemptions { limit },
        None => Decision::Eligible,
    }
}

/// Whether a customer with `count` redemptions may redeem again.
pub fn within_redemption_limit(limit: u32, count: u32) -> bool {
    count < limit
}

/// Eligible promotions collected in listing order, bounded by a maximum.
#[derive(Debug, Clone)]
pub struct EligiblePromotions {
    max_results: usize,
    promotions: Vec<Promotion>,
}

impl EligiblePromotions {
    /// Create an empty collection bounded by `max_results`.
    pub fn new(max_results: usize) -> Self {
        Self {
            max_results,
            promotions: Vec::new(),
        }
    }

    /// Whether the maximum has been reached.
    pub fn is_full(&self) -> bool {
        self.promotions.len() >= self.max_results
    }

    /// Configured maximum
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Number of promotions collected.
    pub fn len(&self) -> usize {
        self.promotions.len()
    }

    /// Whether nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.promotions.is_empty()
    }

    /// Add an eligible promotion. Returns `true` once the maximum is reached.
    pub fn accept(&mut self, promotion: Promotion) -> bool {
        if !self.is_full() {
            self.promotions.push(promotion);
        }

        self.is_full()
    }

    /// Consume into the collected promotions.
    pub fn into_vec(self) -> Vec<Promotion> {
        self.promotions
    }
}

/// Result of evaluating a candidate list.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Eligible promotions in listing order
    pub promotions: Vec<Promotion>,

    /// Set when the maximum was reached with candidates left unevaluated
    pub truncated: bool,
}

/// Walk `candidates` in listing order and collect the eligible ones, up to
/// `settings.max_results`.
///
/// `redemption_count` is awaited only for promotions with a per-user limit.
/// Candidates after the maximum is reached are never inspected.
///
/// # Errors
///
/// Returns the first error produced by `redemption_count`.
pub async fn evaluate<I, F, Fut, E>(
    candidates: I,
    quotas: &AccountQuotas,
    settings: EvaluationSettings,
    mut redemption_count: F,
) -> Result<Evaluation, E>
where
    I: IntoIterator<Item = Promotion>,
    F: FnMut(PromotionUuid) -> Fut,
    Fut: Future<Output = Result<u32, E>>,
{
    let mut eligible = EligiblePromotions::new(settings.max_results);
    let mut candidates = candidates.into_iter().peekable();

    while !eligible.is_full() {
        let Some(promotion) = candidates.next() else {
            break;
        };

        let accepted = match decide(&promotion, quotas, settings.unmatched_rewards) {
            Decision::Ineligible => false,
            Decision::Eligible => true,
            Decision::CheckRedemptions { limit } => {
                within_redemption_limit(limit, redemption_count(promotion.uuid).await?)
            }
        };

        if accepted {
            eligible.accept(promotion);
        }
    }

    let truncated = eligible.is_full() && candidates.peek().is_some();

    Ok(Evaluation {
        promotions: eligible.into_vec(),
        truncated,
    })
}

#[cfg(test)]
mod tests {
    use std::{convert::Infallible, future::ready};

    use testresult::TestResult;

    use crate::{
        identity::CustomerUuid,
        promotions::{NewPromotion, RedemptionLimits},
        quotas::{RawQuotaRow, aggregate},
        rewards::{Reward, RewardType, RewardUuid},
    };

    use super::*;

    fn quotas(entries: &[(&str, u32, u32)]) -> AccountQuotas {
        let rows: Vec<RawQuotaRow> = entries
            .iter()
            .flat_map(|&(account, threshold, redeemed)| {
                let redeemed_rows = (0..redeemed).map(move |_| Some(CustomerUuid::new()));

                std::iter::once(None)
                    .chain(redeemed_rows)
                    .map(move |redeemer| RawQuotaRow {
                        account_id: Some(AccountId::from(account)),
                        siebel_acct_id: Some(format!("SBL_{account}")),
                        threshold: Some(threshold),
                        redeemer,
                    })
            })
            .collect();

        aggregate(&rows)
    }

    fn stamping(accounts: &[&str]) -> Promotion {
        let mut promotion = NewPromotion::default().prepare();

        promotion.rewards = accounts
            .iter()
            .map(|account| Reward {
                uuid: RewardUuid::new(),
                promotion: promotion.uuid,
                kind: RewardType::IncreaseMemberAccount,
                account_id: Some(AccountId::from(*account)),
                value: None,
            })
            .collect();

        promotion
    }

    #[test]
    fn promotion_without_rewards_is_ineligible() {
        let promotion = NewPromotion::default().prepare();

        assert_eq!(
            quota_verdict(&promotion, &quotas(&[("A", 10, 0)])),
            QuotaVerdict::NoRewards
        );
        assert_eq!(
            decide(&promotion, &AccountQuotas::default(), UnmatchedRewardPolicy::Eligible),
            Decision::Ineligible
        );
    }

    #[test]
    fn open_quota_makes_promotion_eligible() {
        let verdict = quota_verdict(&stamping(&["A"]), &quotas(&[("A", 10, 5)]));

        assert_eq!(
            verdict,
            QuotaVerdict::Open {
                account_id: AccountId::from("A")
            }
        );
    }

    #[test]
    fn exhausted_quota_is_ineligible_under_any_policy() {
        let promotion = stamping(&["A"]);
        let quotas = quotas(&[("A", 10, 10)]);

        assert_eq!(quota_verdict(&promotion, &quotas), QuotaVerdict::Exhausted);
        assert_eq!(
            decide(&promotion, &quotas, UnmatchedRewardPolicy::Eligible),
            Decision::Ineligible
        );
    }

    #[test]
    fn any_open_account_is_enough() {
        let promotion = stamping(&["A", "B"]);

        assert_eq!(
            quota_verdict(&promotion, &quotas(&[("A", 1, 1), ("B", 2, 0)])),
            QuotaVerdict::Open {
                account_id: AccountId::from("B")
            }
        );
    }

    #[test]
    fn unmatched_rewards_follow_policy() {
        let promotion = stamping(&["Z"]);
        let quotas = quotas(&[("A", 10, 0)]);

        assert_eq!(
            decide(&promotion, &quotas, UnmatchedRewardPolicy::Ineligible),
            Decision::Ineligible
        );
        assert_eq!(
            decide(&promotion, &quotas, UnmatchedRewardPolicy::Eligible),
            Decision::Eligible
        );
    }

    #[test]
    fn per_user_limit_requires_a_count() {
        let mut promotion = stamping(&["A"]);
        promotion.limits = RedemptionLimits {
            per_user: Some(3),
            total: None,
        };

        assert_eq!(
            decide(&promotion, &quotas(&[("A", 10, 0)]), UnmatchedRewardPolicy::Ineligible),
            Decision::CheckRedemptions { limit: 3 }
        );
        assert!(!within_redemption_limit(3, 3));
        assert!(within_redemption_limit(3, 2));
    }

    #[test]
    fn collection_stops_at_maximum() {
        let mut eligible = EligiblePromotions::new(2);

        assert!(!eligible.accept(stamping(&["A"])));
        assert!(eligible.accept(stamping(&["B"])));
        assert!(eligible.accept(stamping(&["C"])));
        assert_eq!(eligible.len(), 2);
    }

    #[test]
    fn zero_maximum_is_full_from_the_start() {
        let eligible = EligiblePromotions::new(0);

        assert!(eligible.is_full());
        assert!(eligible.into_vec().is_empty());
    }

    fn no_counts(_: PromotionUuid) -> std::future::Ready<Result<u32, Infallible>> {
        ready(Ok(0))
    }

    #[tokio::test]
    async fn exactly_filling_the_maximum_is_not_truncated() -> TestResult {
        let quotas = quotas(&[("A", 10, 0)]);
        let settings = EvaluationSettings {
            max_results: 2,
            ..EvaluationSettings::default()
        };

        let evaluation = evaluate(
            vec![stamping(&["A"]), stamping(&["A"])],
            &quotas,
            settings,
            no_counts,
        )
        .await?;

        assert_eq!(evaluation.promotions.len(), 2);
        assert!(!evaluation.truncated, "nothing was left unevaluated");

        Ok(())
    }

    #[tokio::test]
    async fn candidates_left_over_mark_the_result_truncated() -> TestResult {
        let quotas = quotas(&[("A", 10, 0)]);
        let candidates = vec![stamping(&["A"]), stamping(&["A"]), stamping(&["A"])];
        let expected: Vec<_> = candidates.iter().take(2).map(|p| p.uuid).collect();
        let settings = EvaluationSettings {
            max_results: 2,
            ..EvaluationSettings::default()
        };

        let evaluation = evaluate(candidates, &quotas, settings, no_counts).await?;

        assert_eq!(
            evaluation.promotions.iter().map(|p| p.uuid).collect::<Vec<_>>(),
            expected
        );
        assert!(evaluation.truncated, "third candidate was never evaluated");

        Ok(())
    }

    #[tokio::test]
    async fn rejected_candidates_do_not_fill_the_maximum() -> TestResult {
        let quotas = quotas(&[("A", 10, 0), ("B", 1, 1)]);
        let settings = EvaluationSettings {
            max_results: 1,
            ..EvaluationSettings::default()
        };

        let evaluation = evaluate(
            vec![stamping(&["B"]), stamping(&["A"])],
            &quotas,
            settings,
            no_counts,
        )
        .await?;

        assert_eq!(evaluation.promotions.len(), 1);
        assert!(!evaluation.truncated, "every candidate was evaluated");

        Ok(())
    }

    #[tokio::test]
    async fn redemption_counts_are_requested_only_for_limited_promotions() -> TestResult {
        let quotas = quotas(&[("A", 10, 0)]);

        let mut limited = stamping(&["A"]);
        limited.limits = RedemptionLimits {
            per_user: Some(2),
            total: None,
        };

        let limited_uuid = limited.uuid;
        let mut requested = Vec::new();

        let evaluation = evaluate(
            vec![stamping(&["A"]), limited],
            &quotas,
            EvaluationSettings::default(),
            |uuid| {
                requested.push(uuid);

                ready(Ok::<_, Infallible>(2))
            },
        )
        .await?;

        assert_eq!(requested, vec![limited_uuid]);
        assert_eq!(evaluation.promotions.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn count_errors_stop_the_evaluation() {
        let mut limited = stamping(&["A"]);
        limited.limits = RedemptionLimits {
            per_user: Some(1),
            total: None,
        };

        let result = evaluate(
            vec![limited],
            &quotas(&[("A", 10, 0)]),
            EvaluationSettings::default(),
            |_| ready(Err::<u32, _>("store unavailable")),
        )
        .await;

        assert!(
            matches!(result, Err("store unavailable")),
            "expected count error, got {result:?}"
        );
    }
}
