//! Tiers service.

use async_trait::async_trait;
use estamp::{
    accounts::AccountId, identity::RedemptionUuid, promotions::PromotionUuid,
    rewards::TierIncrement, tiers::StampTier,
};
use mockall::automock;
use smallvec::SmallVec;
use tracing::{Span, error, info, warn};

use crate::{
    database::Db,
    domain::tiers::{
        data::RedemptionApplication, errors::TiersServiceError, repository::PgTiersRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgTiersService {
    db: Db,
    repository: PgTiersRepository,
}

impl PgTiersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgTiersRepository::new(),
        }
    }
}

#[async_trait]
impl TiersService for PgTiersService {
    #[tracing::instrument(
        name = "tiers.service.get_tier",
        skip(self),
        fields(account_id = %account_id),
        err
    )]
    async fn get_tier(&self, account_id: &AccountId) -> Result<Option<StampTier>, TiersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let tier = self.repository.get(&mut tx, account_id).await?;

        tx.commit().await?;

        if tier.is_none() {
            warn!("e-stamp tier not found");
        }

        Ok(tier)
    }

    #[tracing::instrument(name = "tiers.service.list_by_siebel", skip(self), err)]
    async fn list_by_siebel(
        &self,
        siebel_acct_id: &str,
    ) -> Result<Vec<StampTier>, TiersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let tiers = self.repository.list_by_siebel(&mut tx, siebel_acct_id).await?;

        tx.commit().await?;

        Ok(tiers)
    }

    #[tracing::instrument(name = "tiers.service.list_by_level", skip(self), err)]
    async fn list_by_level(&self, level: u32) -> Result<Vec<StampTier>, TiersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let tiers = self.repository.list_by_level(&mut tx, level).await?;

        tx.commit().await?;

        Ok(tiers)
    }

    #[tracing::instrument(name = "tiers.service.list_open", skip(self), err)]
    async fn list_open(&self) -> Result<Vec<StampTier>, TiersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let tiers = self.repository.list_open(&mut tx).await?;

        tx.commit().await?;

        Ok(tiers)
    }

    #[tracing::instrument(
        name = "tiers.service.increment_stamp_count",
        skip(self),
        fields(account_id = %account_id, stamp_count = tracing::field::Empty),
        err
    )]
    async fn increment_stamp_count(
        &self,
        account_id: &AccountId,
        amount: u32,
    ) -> Result<Option<StampTier>, TiersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let Some(mut tier) = self.repository.get_for_update(&mut tx, account_id).await? else {
            error!("cannot increment stamp count: e-stamp tier not found");

            return Ok(None);
        };

        let count = tier.increment(amount);

        self.repository.update_stamp_count(&mut tx, &tier).await?;

        tx.commit().await?;

        Span::current().record("stamp_count", count);

        info!(max_count = tier.max_count(), "incremented stamp count");

        Ok(Some(tier))
    }

    #[tracing::instrument(
        name = "tiers.service.reset_stamp_count",
        skip(self),
        fields(account_id = %account_id),
        err
    )]
    async fn reset_stamp_count(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<StampTier>, TiersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let Some(mut tier) = self.repository.get_for_update(&mut tx, account_id).await? else {
            return Ok(None);
        };

        tier.reset();

        self.repository.update_stamp_count(&mut tx, &tier).await?;

        tx.commit().await?;

        info!("reset stamp count");

        Ok(Some(tier))
    }

    #[tracing::instrument(
        name = "tiers.service.save_tier",
        skip(self, tier),
        fields(account_id = %tier.account_id()),
        err
    )]
    async fn save_tier(&self, tier: StampTier) -> Result<StampTier, TiersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        self.repository.save(&mut tx, &tier).await?;

        tx.commit().await?;

        Ok(tier)
    }

    #[tracing::instrument(
        name = "tiers.service.apply_redemption",
        skip(self, increments),
        fields(
            redemption_uuid = %redemption,
            promotion_uuid = %promotion,
            increment_count = increments.len()
        ),
        err
    )]
    async fn apply_redemption(
        &self,
        redemption: RedemptionUuid,
        promotion: PromotionUuid,
        increments: &[TierIncrement],
    ) -> Result<RedemptionApplication, TiersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let first_time = self
            .repository
            .record_processed_redemption(&mut tx, redemption, promotion)
            .await?;

        if !first_time {
            info!("redemption already processed");

            return Ok(RedemptionApplication::Duplicate);
        }

        // Rows are locked in account order so concurrent redemptions cannot deadlock.
        let mut ordered: SmallVec<[&TierIncrement; 4]> = increments.iter().collect();
        ordered.sort_by(|a, b| a.account_id.cmp(&b.account_id));

        let mut incremented = Vec::with_capacity(ordered.len());
        let mut missing = Vec::new();

        for increment in ordered {
            let Some(mut tier) = self
                .repository
                .get_for_update(&mut tx, &increment.account_id)
                .await?
            else {
                error!(
                    account_id = %increment.account_id,
                    "cannot increment stamp count: e-stamp tier not found"
                );

                missing.push(increment.account_id.clone());
                continue;
            };

            tier.increment(increment.amount);

            self.repository.update_stamp_count(&mut tx, &tier).await?;

            incremented.push(tier);
        }

        tx.commit().await?;

        info!(
            incremented = incremented.len(),
            missing = missing.len(),
            "applied redemption"
        );

        Ok(RedemptionApplication::Applied {
            incremented,
            missing,
        })
    }
}

#[automock]
#[async_trait]
pub trait TiersService: Send + Sync {
    /// Retrieve the tier of an account.
    async fn get_tier(&self, account_id: &AccountId) -> Result<Option<StampTier>, TiersServiceError>;

    /// Tiers sharing a secondary (CRM) account.
    async fn list_by_siebel(
        &self,
        siebel_acct_id: &str,
    ) -> Result<Vec<StampTier>, TiersServiceError>;

    /// Tiers at a level.
    async fn list_by_level(&self, level: u32) -> Result<Vec<StampTier>, TiersServiceError>;

    /// Tiers below their cap, lowest level first.
    async fn list_open(&self) -> Result<Vec<StampTier>, TiersServiceError>;

    /// Add stamps to an account's tier, saturating at its cap. Returns the
    /// updated tier, or `None` when the account has no tier.
    async fn increment_stamp_count(
        &self,
        account_id: &AccountId,
        amount: u32,
    ) -> Result<Option<StampTier>, TiersServiceError>;

    /// Clear an account's stamp count. Returns `None` when the account has no tier.
    async fn reset_stamp_count(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<StampTier>, TiersServiceError>;

    /// Insert or replace a tier.
    async fn save_tier(&self, tier: StampTier) -> Result<StampTier, TiersServiceError>;

    /// Apply a redemption's increments once. The redemption is recorded in the
    /// same transaction, so replays report [`RedemptionApplication::Duplicate`].
    async fn apply_redemption(
        &self,
        redemption: RedemptionUuid,
        promotion: PromotionUuid,
        increments: &[TierIncrement],
    ) -> Result<RedemptionApplication, TiersServiceError>;
}
