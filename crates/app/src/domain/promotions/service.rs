//! Promotions Service

use async_trait::async_trait;
use estamp::{
    identity::CatalogVersionUuid,
    promotions::{NewPromotion, Promotion, PromotionStatus, PromotionUuid},
    rewards::Reward,
};
use jiff::Timestamp;
use mockall::automock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use sqlx::{Postgres, Transaction};
use tracing::{Span, info, warn};

use crate::{
    database::Db,
    domain::{
        promotions::{
            PromotionsServiceError, records::PromotionRecord,
            repository::PgPromotionsRepository,
        },
        rewards::repository::PgRewardsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgPromotionsService {
    db: Db,
    promotions: PgPromotionsRepository,
    rewards: PgRewardsRepository,
}

impl PgPromotionsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            promotions: PgPromotionsRepository::new(),
            rewards: PgRewardsRepository::new(),
        }
    }

    async fn with_rewards(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        records: Vec<PromotionRecord>,
    ) -> Result<Vec<Promotion>, sqlx::Error> {
        let uuids: SmallVec<[PromotionUuid; 16]> = records.iter().map(|r| r.uuid).collect();

        let rewards = self.rewards.list_for_promotions(tx, &uuids).await?;

        let mut by_promotion: FxHashMap<PromotionUuid, Vec<Reward>> = FxHashMap::default();

        for reward in rewards {
            by_promotion.entry(reward.promotion).or_default().push(reward);
        }

        Ok(records
            .into_iter()
            .map(|record| {
                let rewards = by_promotion.remove(&record.uuid).unwrap_or_default();

                record.into_promotion(rewards)
            })
            .collect())
    }

    async fn fetch_one(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotion: PromotionUuid,
    ) -> Result<Option<Promotion>, sqlx::Error> {
        let Some(record) = self.promotions.get(tx, promotion).await? else {
            return Ok(None);
        };

        Ok(self.with_rewards(tx, vec![record]).await?.pop())
    }
}

#[async_trait]
impl PromotionsService for PgPromotionsService {
    #[tracing::instrument(
        name = "promotions.service.get_promotion",
        skip(self),
        fields(promotion_uuid = %promotion),
        err
    )]
    async fn get_promotion(
        &self,
        promotion: PromotionUuid,
    ) -> Result<Option<Promotion>, PromotionsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let found = self.fetch_one(&mut tx, promotion).await?;

        tx.commit().await?;

        if found.is_none() {
            warn!("promotion not found");
        }

        Ok(found)
    }

    #[tracing::instrument(
        name = "promotions.service.list_by_status",
        skip(self),
        fields(status = %status, promotion_count = tracing::field::Empty),
        err
    )]
    async fn list_by_status(
        &self,
        status: PromotionStatus,
    ) -> Result<Vec<Promotion>, PromotionsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let records = self.promotions.list_by_status(&mut tx, status).await?;
        let promotions = self.with_rewards(&mut tx, records).await?;

        tx.commit().await?;

        Span::current().record("promotion_count", promotions.len());

        Ok(promotions)
    }

    #[tracing::instrument(
        name = "promotions.service.list_active",
        skip(self),
        fields(promotion_count = tracing::field::Empty),
        err
    )]
    async fn list_active(
        &self,
        point_in_time: Timestamp,
    ) -> Result<Vec<Promotion>, PromotionsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let records = self
            .promotions
            .list_active(&mut tx, point_in_time, true)
            .await?;
        let promotions = self.with_rewards(&mut tx, records).await?;

        tx.commit().await?;

        Span::current().record("promotion_count", promotions.len());

        Ok(promotions)
    }

    #[tracing::instrument(
        name = "promotions.service.list_active_unsuspended",
        skip(self),
        fields(promotion_count = tracing::field::Empty),
        err
    )]
    async fn list_active_unsuspended(
        &self,
        point_in_time: Timestamp,
    ) -> Result<Vec<Promotion>, PromotionsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let records = self
            .promotions
            .list_active(&mut tx, point_in_time, false)
            .await?;
        let promotions = self.with_rewards(&mut tx, records).await?;

        tx.commit().await?;

        Span::current().record("promotion_count", promotions.len());

        Ok(promotions)
    }

    #[tracing::instrument(
        name = "promotions.service.list_by_tag_code",
        skip(self),
        fields(tag_code = %code),
        err
    )]
    async fn list_by_tag_code(
        &self,
        code: &str,
    ) -> Result<Vec<Promotion>, PromotionsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let records = self.promotions.list_by_tag_code(&mut tx, code).await?;
        let promotions = self.with_rewards(&mut tx, records).await?;

        tx.commit().await?;

        Ok(promotions)
    }

    #[tracing::instrument(name = "promotions.service.list_expired", skip(self), err)]
    async fn list_expired(
        &self,
        point_in_time: Timestamp,
        limit: usize,
    ) -> Result<Vec<Promotion>, PromotionsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let records = self
            .promotions
            .list_expired(&mut tx, point_in_time, limit)
            .await?;
        let promotions = self.with_rewards(&mut tx, records).await?;

        tx.commit().await?;

        Ok(promotions)
    }

    #[tracing::instrument(name = "promotions.service.list_removable", skip(self), err)]
    async fn list_removable(
        &self,
        cutoff: Timestamp,
        limit: usize,
    ) -> Result<Vec<Promotion>, PromotionsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let records = self
            .promotions
            .list_removable(&mut tx, cutoff, limit)
            .await?;
        let promotions = self.with_rewards(&mut tx, records).await?;

        tx.commit().await?;

        Ok(promotions)
    }

    #[tracing::instrument(name = "promotions.service.list_by_date_range", skip(self), err)]
    async fn list_by_date_range(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Promotion>, PromotionsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let records = self
            .promotions
            .list_by_date_range(&mut tx, from, to)
            .await?;
        let promotions = self.with_rewards(&mut tx, records).await?;

        tx.commit().await?;

        Ok(promotions)
    }

    #[tracing::instrument(
        name = "promotions.service.list_for_catalog_version",
        skip(self),
        fields(catalog_version_uuid = %catalog_version),
        err
    )]
    async fn list_for_catalog_version(
        &self,
        catalog_version: CatalogVersionUuid,
        point_in_time: Timestamp,
    ) -> Result<Vec<Promotion>, PromotionsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let records = self
            .promotions
            .list_for_catalog_version(&mut tx, catalog_version, point_in_time)
            .await?;
        let promotions = self.with_rewards(&mut tx, records).await?;

        tx.commit().await?;

        Ok(promotions)
    }

    #[tracing::instrument(
        name = "promotions.service.create_promotion",
        skip(self, promotion),
        fields(
            promotion_uuid = tracing::field::Empty,
            status = tracing::field::Empty,
            tag_code = tracing::field::Empty
        ),
        err
    )]
    async fn create_promotion(
        &self,
        promotion: NewPromotion,
    ) -> Result<Promotion, PromotionsServiceError> {
        let promotion = promotion.prepare();

        let span = Span::current();

        span.record("promotion_uuid", tracing::field::display(promotion.uuid));
        span.record("status", tracing::field::display(promotion.status));

        if let Some(tag) = &promotion.tag {
            span.record("tag_code", tracing::field::display(&tag.code));
        }

        promotion.validate(true)?;

        let mut tx = self.db.begin_transaction().await?;

        let tag_uuid = match &promotion.tag {
            Some(tag) => Some(self.promotions.upsert_tag(&mut tx, tag).await?),
            None => None,
        };

        self.promotions.create(&mut tx, &promotion, tag_uuid).await?;

        tx.commit().await?;

        info!(promotion_uuid = %promotion.uuid, "created promotion");

        Ok(promotion)
    }

    #[tracing::instrument(
        name = "promotions.service.update_status",
        skip(self),
        fields(promotion_uuid = %promotion, status = %status),
        err
    )]
    async fn update_status(
        &self,
        promotion: PromotionUuid,
        status: PromotionStatus,
    ) -> Result<Promotion, PromotionsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let mut current = self
            .fetch_one(&mut tx, promotion)
            .await?
            .ok_or(PromotionsServiceError::NotFound)?;

        current.status = status;
        current.validate(false)?;

        self.promotions
            .update_status(&mut tx, promotion, status)
            .await?;

        tx.commit().await?;

        info!("updated promotion status");

        Ok(current)
    }

    #[tracing::instrument(
        name = "promotions.service.suspend",
        skip(self),
        fields(promotion_uuid = %promotion),
        err
    )]
    async fn suspend(&self, promotion: PromotionUuid) -> Result<(), PromotionsServiceError> {
        self.set_suspended(promotion, true).await
    }

    #[tracing::instrument(
        name = "promotions.service.resume",
        skip(self),
        fields(promotion_uuid = %promotion),
        err
    )]
    async fn resume(&self, promotion: PromotionUuid) -> Result<(), PromotionsServiceError> {
        self.set_suspended(promotion, false).await
    }

    #[tracing::instrument(
        name = "promotions.service.mark_expired",
        skip(self, promotions),
        fields(requested = promotions.len(), marked = tracing::field::Empty),
        err
    )]
    async fn mark_expired(
        &self,
        promotions: &[PromotionUuid],
    ) -> Result<u64, PromotionsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let marked = self.promotions.mark_expired(&mut tx, promotions).await?;

        tx.commit().await?;

        Span::current().record("marked", marked);

        Ok(marked)
    }

    #[tracing::instrument(
        name = "promotions.service.remove_promotion",
        skip(self),
        fields(promotion_uuid = %promotion),
        err
    )]
    async fn remove_promotion(
        &self,
        promotion: PromotionUuid,
    ) -> Result<bool, PromotionsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self.promotions.delete(&mut tx, promotion).await?;

        tx.commit().await?;

        if rows_affected == 0 {
            warn!("promotion not found");
        }

        Ok(rows_affected > 0)
    }
}

impl PgPromotionsService {
    async fn set_suspended(
        &self,
        promotion: PromotionUuid,
        suspended: bool,
    ) -> Result<(), PromotionsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self
            .promotions
            .set_suspended(&mut tx, promotion, suspended)
            .await?;

        if rows_affected == 0 {
            return Err(PromotionsServiceError::NotFound);
        }

        tx.commit().await?;

        info!(suspended, "changed promotion suspension");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait PromotionsService: Send + Sync {
    /// Retrieve a promotion with its rewards.
    async fn get_promotion(
        &self,
        promotion: PromotionUuid,
    ) -> Result<Option<Promotion>, PromotionsServiceError>;

    /// Promotions with the given status.
    async fn list_by_status(
        &self,
        status: PromotionStatus,
    ) -> Result<Vec<Promotion>, PromotionsServiceError>;

    /// Active promotions whose window contains `point_in_time`, suspended or not.
    async fn list_active(
        &self,
        point_in_time: Timestamp,
    ) -> Result<Vec<Promotion>, PromotionsServiceError>;

    /// Active, unsuspended promotions whose window contains `point_in_time`,
    /// highest priority first.
    async fn list_active_unsuspended(
        &self,
        point_in_time: Timestamp,
    ) -> Result<Vec<Promotion>, PromotionsServiceError>;

    /// Promotions tagged with `code`.
    async fn list_by_tag_code(&self, code: &str)
    -> Result<Vec<Promotion>, PromotionsServiceError>;

    /// Up to `limit` promotions whose end date has passed but are not yet expired.
    async fn list_expired(
        &self,
        point_in_time: Timestamp,
        limit: usize,
    ) -> Result<Vec<Promotion>, PromotionsServiceError>;

    /// Up to `limit` expired promotions that ended before `cutoff`.
    async fn list_removable(
        &self,
        cutoff: Timestamp,
        limit: usize,
    ) -> Result<Vec<Promotion>, PromotionsServiceError>;

    /// Promotions running entirely within `[from, to]`.
    async fn list_by_date_range(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Promotion>, PromotionsServiceError>;

    /// Live promotions covering products of a catalog version.
    async fn list_for_catalog_version(
        &self,
        catalog_version: CatalogVersionUuid,
        point_in_time: Timestamp,
    ) -> Result<Vec<Promotion>, PromotionsServiceError>;

    /// Fill defaults, validate and store a new promotion.
    async fn create_promotion(
        &self,
        promotion: NewPromotion,
    ) -> Result<Promotion, PromotionsServiceError>;

    /// Change a promotion's status after validating the result.
    async fn update_status(
        &self,
        promotion: PromotionUuid,
        status: PromotionStatus,
    ) -> Result<Promotion, PromotionsServiceError>;

    /// Withdraw a promotion without changing its status.
    async fn suspend(&self, promotion: PromotionUuid) -> Result<(), PromotionsServiceError>;

    /// Lift a suspension.
    async fn resume(&self, promotion: PromotionUuid) -> Result<(), PromotionsServiceError>;

    /// Move promotions to the expired status. Returns how many changed.
    async fn mark_expired(
        &self,
        promotions: &[PromotionUuid],
    ) -> Result<u64, PromotionsServiceError>;

    /// Remove a promotion and its rewards. Returns `false` when it did not exist.
    async fn remove_promotion(
        &self,
        promotion: PromotionUuid,
    ) -> Result<bool, PromotionsServiceError>;
}
