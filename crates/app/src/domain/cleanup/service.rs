//! Promotion cleanup job.

use std::sync::Arc;

use async_trait::async_trait;
use estamp::{
    cleanup::{CleanupReport, CleanupSettings},
    promotions::PromotionUuid,
};
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, info, warn};

use crate::domain::{cleanup::errors::CleanupError, promotions::PromotionsService};

/// Expires ended promotions and removes those past the retention period.
#[derive(Clone)]
pub struct PromotionCleanupJob {
    promotions: Arc<dyn PromotionsService>,
    settings: CleanupSettings,
}

impl PromotionCleanupJob {
    #[must_use]
    pub fn new(promotions: Arc<dyn PromotionsService>, settings: CleanupSettings) -> Self {
        Self {
            promotions,
            settings,
        }
    }
}

#[async_trait]
impl CleanupService for PromotionCleanupJob {
    #[tracing::instrument(
        name = "cleanup.service.run",
        skip(self),
        fields(
            days = self.settings.days,
            batch_size = self.settings.batch_size,
            marked = tracing::field::Empty,
            removed = tracing::field::Empty
        ),
        err
    )]
    async fn run(&self, now: Timestamp) -> Result<CleanupReport, CleanupError> {
        let batch_size = self.settings.batch_size;
        let mut report = CleanupReport::default();

        let ended: Vec<PromotionUuid> = self
            .promotions
            .list_expired(now, batch_size)
            .await?
            .into_iter()
            .map(|promotion| promotion.uuid)
            .collect();

        if !ended.is_empty() {
            let changed = self.promotions.mark_expired(&ended).await?;

            report.marked = usize::try_from(changed).unwrap_or(usize::MAX);
        }

        let cutoff = self.settings.retention_cutoff(now);

        for promotion in self.promotions.list_removable(cutoff, batch_size).await? {
            if report.removed >= batch_size {
                break;
            }

            if self.promotions.remove_promotion(promotion.uuid).await? {
                report.removed += 1;
            } else {
                warn!(promotion_uuid = %promotion.uuid, "expired promotion vanished before removal");
            }
        }

        Span::current().record("marked", report.marked);
        Span::current().record("removed", report.removed);

        info!(
            marked = report.marked,
            removed = report.removed,
            %cutoff,
            "promotion cleanup finished"
        );

        Ok(report)
    }
}

#[automock]
#[async_trait]
pub trait CleanupService: Send + Sync {
    /// Run one cleanup pass at `now`.
    async fn run(&self, now: Timestamp) -> Result<CleanupReport, CleanupError>;
}
