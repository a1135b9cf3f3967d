//! Evaluation Config

use clap::Args;
use estamp::eligibility::{DEFAULT_MAX_RESULTS, EvaluationSettings, UnmatchedRewardPolicy};

/// Treatment of promotions whose rewards match no account quota.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum UnmatchedRewards {
    /// Reject them.
    Ineligible,

    /// Accept them, subject to per-user limits.
    Eligible,
}

impl From<UnmatchedRewards> for UnmatchedRewardPolicy {
    fn from(value: UnmatchedRewards) -> Self {
        match value {
            UnmatchedRewards::Ineligible => Self::Ineligible,
            UnmatchedRewards::Eligible => Self::Eligible,
        }
    }
}

/// Evaluation settings.
#[derive(Debug, Args)]
pub struct EvaluationConfig {
    /// Maximum number of eligible promotions returned per evaluation
    #[arg(long, env = "EVALUATION_MAX_RESULTS", default_value_t = DEFAULT_MAX_RESULTS)]
    pub evaluation_max_results: usize,

    /// Reserved; evaluations are not cached
    #[arg(long, env = "EVALUATION_CACHE_ENABLED", default_value_t = false)]
    pub evaluation_cache_enabled: bool,

    /// Treatment of promotions whose rewards match no quota (ineligible, eligible)
    #[arg(
        long,
        env = "EVALUATION_UNMATCHED_REWARDS",
        value_enum,
        default_value_t = UnmatchedRewards::Ineligible
    )]
    pub evaluation_unmatched_rewards: UnmatchedRewards,
}

impl EvaluationConfig {
    /// Build evaluation settings from this configuration.
    pub fn settings(&self) -> EvaluationSettings {
        EvaluationSettings {
            max_results: self.evaluation_max_results,
            cache_enabled: self.evaluation_cache_enabled,
            unmatched_rewards: self.evaluation_unmatched_rewards.into(),
        }
    }
}
