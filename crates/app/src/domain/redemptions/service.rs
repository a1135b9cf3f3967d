//! Redemption consumer.

use std::sync::Arc;

use async_trait::async_trait;
use estamp::rewards::stamp_increments;
use mockall::automock;
use tracing::{debug, info};

use crate::domain::{
    promotions::PromotionsService,
    redemptions::{
        data::{RedemptionEvent, RedemptionOutcome},
        errors::RedemptionsError,
    },
    tiers::{TiersService, data::RedemptionApplication},
};

/// Credits e-stamp tiers when a promotion's coupon is redeemed.
#[derive(Clone)]
pub struct RedemptionConsumer {
    promotions: Arc<dyn PromotionsService>,
    tiers: Arc<dyn TiersService>,
}

impl RedemptionConsumer {
    #[must_use]
    pub fn new(promotions: Arc<dyn PromotionsService>, tiers: Arc<dyn TiersService>) -> Self {
        Self { promotions, tiers }
    }
}

#[async_trait]
impl RedemptionsService for RedemptionConsumer {
    #[tracing::instrument(
        name = "redemptions.service.on_redemption",
        skip(self, event),
        fields(
            redemption_uuid = %event.redemption,
            promotion_uuid = %event.promotion,
            customer_uuid = %event.customer
        ),
        err
    )]
    async fn on_redemption(
        &self,
        event: &RedemptionEvent,
    ) -> Result<RedemptionOutcome, RedemptionsError> {
        let Some(promotion) = self.promotions.get_promotion(event.promotion).await? else {
            debug!("redeemed promotion not found; skipping");

            return Ok(RedemptionOutcome::Skipped);
        };

        let increments = stamp_increments(&promotion.rewards);

        if increments.is_empty() {
            debug!("promotion has no e-stamp rewards; skipping");

            return Ok(RedemptionOutcome::Skipped);
        }

        let application = self
            .tiers
            .apply_redemption(event.redemption, promotion.uuid, &increments)
            .await?;

        Ok(match application {
            RedemptionApplication::Duplicate => RedemptionOutcome::Duplicate,
            RedemptionApplication::Applied {
                incremented,
                missing,
            } => {
                info!(
                    incremented = incremented.len(),
                    missing = missing.len(),
                    "credited e-stamp tiers"
                );

                RedemptionOutcome::Applied {
                    incremented,
                    missing,
                }
            }
        })
    }
}

#[automock]
#[async_trait]
pub trait RedemptionsService: Send + Sync {
    /// Apply the e-stamp rewards of a redeemed promotion once per redemption.
    async fn on_redemption(
        &self,
        event: &RedemptionEvent,
    ) -> Result<RedemptionOutcome, RedemptionsError>;
}
