//! Fixtures
//!
//! Evaluation scenarios described in YAML: the raw quota rows a reader would
//! return, the candidate promotions in listing order, and the customer's
//! redemption counts.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    accounts::AccountId,
    eligibility::{EvaluationSettings, UnmatchedRewardPolicy},
    identity::CustomerUuid,
    promotions::{NewPromotion, Promotion, PromotionStatus, PromotionUuid, RedemptionLimits},
    quotas::RawQuotaRow,
    rewards::{Reward, RewardType, RewardUuid},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Two promotions share a name
    #[error("Duplicate promotion name: {0}")]
    DuplicatePromotion(String),

    /// Expected result names an unknown promotion
    #[error("Promotion not found: {0}")]
    PromotionNotFound(String),
}

#[derive(Debug, Deserialize)]
struct ScenarioFixture {
    #[serde(default)]
    max_results: Option<usize>,

    #[serde(default)]
    unmatched_rewards: UnmatchedRewardPolicy,

    #[serde(default)]
    rows: Vec<RowFixture>,

    #[serde(default)]
    promotions: Vec<PromotionFixture>,

    #[serde(default)]
    expected: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RowFixture {
    account: Option<String>,
    siebel: Option<String>,
    threshold: Option<u32>,

    #[serde(default)]
    redeemed: bool,
}

#[derive(Debug, Deserialize)]
struct PromotionFixture {
    name: String,

    #[serde(default)]
    priority: Option<i32>,

    #[serde(default)]
    max_redemption_per_user: Option<u32>,

    #[serde(default)]
    redemptions: u32,

    #[serde(default)]
    rewards: Vec<RewardFixture>,
}

#[derive(Debug, Deserialize)]
struct RewardFixture {
    #[serde(rename = "type")]
    kind: RewardType,

    #[serde(default)]
    account: Option<String>,

    #[serde(default)]
    value: Option<u32>,
}

/// A loaded evaluation scenario.
#[derive(Debug)]
pub struct Scenario {
    customer: CustomerUuid,
    settings: EvaluationSettings,
    rows: Vec<RawQuotaRow>,
    promotions: Vec<Promotion>,
    names: FxHashMap<PromotionUuid, String>,
    redemptions: FxHashMap<PromotionUuid, u32>,
    expected: Vec<PromotionUuid>,
}

impl Scenario {
    /// Customer the rows were fetched for
    pub fn customer(&self) -> CustomerUuid {
        self.customer
    }

    /// Evaluation settings
    pub fn settings(&self) -> EvaluationSettings {
        self.settings
    }

    /// Raw quota rows
    pub fn rows(&self) -> &[RawQuotaRow] {
        &self.rows
    }

    /// Candidate promotions in listing order
    pub fn promotions(&self) -> &[Promotion] {
        &self.promotions
    }

    /// Customer's redemption count for a promotion; 0 when none.
    pub fn redemption_count(&self, promotion: PromotionUuid) -> u32 {
        self.redemptions.get(&promotion).copied().unwrap_or_default()
    }

    /// Fixture name of a promotion.
    pub fn name_of(&self, promotion: PromotionUuid) -> Option<&str> {
        self.names.get(&promotion).map(String::as_str)
    }

    /// Promotions the scenario expects to be eligible, in order.
    pub fn expected(&self) -> &[PromotionUuid] {
        &self.expected
    }
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    base_path: PathBuf,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a fixture loader with the default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a fixture loader with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load a scenario from `scenarios/{name}.yml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if promotion
    /// names repeat, or if an expected promotion is not defined.
    pub fn load_scenario(&self, name: &str) -> Result<Scenario, FixtureError> {
        let file_path = self.base_path.join("scenarios").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ScenarioFixture = serde_norway::from_str(&contents)?;

        let customer = CustomerUuid::new();

        let rows = fixture
            .rows
            .into_iter()
            .map(|row| RawQuotaRow {
                account_id: row.account.map(AccountId::from),
                siebel_acct_id: row.siebel,
                threshold: row.threshold,
                redeemer: row.redeemed.then_some(customer),
            })
            .collect();

        let mut by_name: FxHashMap<String, PromotionUuid> = FxHashMap::default();
        let mut names = FxHashMap::default();
        let mut redemptions = FxHashMap::default();
        let mut promotions = Vec::with_capacity(fixture.promotions.len());

        for promotion_fixture in fixture.promotions {
            let mut promotion = NewPromotion {
                status: Some(PromotionStatus::Active),
                priority: promotion_fixture.priority,
                limits: RedemptionLimits {
                    per_user: promotion_fixture.max_redemption_per_user,
                    total: None,
                },
                ..NewPromotion::default()
            }
            .prepare();

            promotion.rewards = promotion_fixture
                .rewards
                .into_iter()
                .map(|reward| Reward {
                    uuid: RewardUuid::new(),
                    promotion: promotion.uuid,
                    kind: reward.kind,
                    account_id: reward.account.map(AccountId::from),
                    value: reward.value,
                })
                .collect();

            if by_name
                .insert(promotion_fixture.name.clone(), promotion.uuid)
                .is_some()
            {
                return Err(FixtureError::DuplicatePromotion(promotion_fixture.name));
            }

            redemptions.insert(promotion.uuid, promotion_fixture.redemptions);
            names.insert(promotion.uuid, promotion_fixture.name);
            promotions.push(promotion);
        }

        let expected = fixture
            .expected
            .into_iter()
            .map(|name| {
                by_name
                    .get(&name)
                    .copied()
                    .ok_or(FixtureError::PromotionNotFound(name))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let defaults = EvaluationSettings::default();

        Ok(Scenario {
            customer,
            settings: EvaluationSettings {
                max_results: fixture.max_results.unwrap_or(defaults.max_results),
                unmatched_rewards: fixture.unmatched_rewards,
                ..defaults
            },
            rows,
            promotions,
            names,
            redemptions,
            expected,
        })
    }
}
