//! Eligibility evaluator.

use std::sync::Arc;

use async_trait::async_trait;
use estamp::{
    eligibility::{EvaluationSettings, evaluate},
    identity::{CatalogVersionUuid, CustomerUuid},
    promotions::Promotion,
};
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, debug, info};

use crate::domain::{
    eligibility::errors::EligibilityError, promotions::PromotionsService,
    quotas::AccountQuotaService,
};

/// Evaluates live promotions against a customer's account quotas.
#[derive(Clone)]
pub struct PromotionEvaluator {
    quotas: Arc<dyn AccountQuotaService>,
    promotions: Arc<dyn PromotionsService>,
    settings: EvaluationSettings,
}

impl PromotionEvaluator {
    #[must_use]
    pub fn new(
        quotas: Arc<dyn AccountQuotaService>,
        promotions: Arc<dyn PromotionsService>,
        settings: EvaluationSettings,
    ) -> Self {
        Self {
            quotas,
            promotions,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> EvaluationSettings {
        self.settings
    }
}

#[async_trait]
impl EligibilityService for PromotionEvaluator {
    #[tracing::instrument(
        name = "eligibility.service.evaluate_eligible",
        skip(self),
        fields(
            customer_uuid = %customer,
            catalog_version_uuid = %catalog_version,
            max_results = self.settings.max_results,
            candidate_count = tracing::field::Empty,
            eligible_count = tracing::field::Empty
        ),
        err
    )]
    async fn evaluate_eligible(
        &self,
        customer: CustomerUuid,
        catalog_version: CatalogVersionUuid,
        point_in_time: Timestamp,
    ) -> Result<Vec<Promotion>, EligibilityError> {
        if self.settings.max_results == 0 {
            return Ok(Vec::new());
        }

        let quotas = self
            .quotas
            .get_account_quotas(customer, catalog_version, point_in_time)
            .await?;

        let candidates = self
            .promotions
            .list_active_unsuspended(point_in_time)
            .await?;

        Span::current().record("candidate_count", candidates.len());

        let evaluation = evaluate(candidates, &quotas, self.settings, |promotion| {
            debug!(promotion_uuid = %promotion, "checking per-user redemption limit");

            self.quotas.get_redemption_count(promotion, customer)
        })
        .await?;

        if evaluation.truncated {
            info!(
                max_results = self.settings.max_results,
                "eligible promotions truncated at the configured maximum"
            );
        }

        Span::current().record("eligible_count", evaluation.promotions.len());

        Ok(evaluation.promotions)
    }
}

#[automock]
#[async_trait]
pub trait EligibilityService: Send + Sync {
    /// Promotions the customer may still benefit from, in listing order and
    /// bounded by the configured maximum.
    async fn evaluate_eligible(
        &self,
        customer: CustomerUuid,
        catalog_version: CatalogVersionUuid,
        point_in_time: Timestamp,
    ) -> Result<Vec<Promotion>, EligibilityError>;
}
