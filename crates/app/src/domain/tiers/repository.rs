//! Tiers Repository

use estamp::{
    accounts::AccountId, identity::RedemptionUuid, promotions::PromotionUuid, tiers::StampTier,
};
use sqlx::{Postgres, Transaction, query, query_as};

use crate::domain::{columns::encode_u32, tiers::records::TierRecord};

const GET_TIER_SQL: &str = include_str!("sql/get_tier.sql");
const GET_TIER_FOR_UPDATE_SQL: &str = include_str!("sql/get_tier_for_update.sql");
const LIST_TIERS_BY_SIEBEL_SQL: &str = include_str!("sql/list_tiers_by_siebel.sql");
const LIST_TIERS_BY_LEVEL_SQL: &str = include_str!("sql/list_tiers_by_level.sql");
const LIST_OPEN_TIERS_SQL: &str = include_str!("sql/list_open_tiers.sql");
const UPDATE_STAMP_COUNT_SQL: &str = include_str!("sql/update_stamp_count.sql");
const SAVE_TIER_SQL: &str = include_str!("sql/save_tier.sql");
const RECORD_PROCESSED_REDEMPTION_SQL: &str = include_str!("sql/record_processed_redemption.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgTiersRepository;

impl PgTiersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account_id: &AccountId,
    ) -> Result<Option<StampTier>, sqlx::Error> {
        let record = query_as::<Postgres, TierRecord>(GET_TIER_SQL)
            .bind(account_id.as_str())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(record.map(StampTier::from))
    }

    /// Fetch a tier and lock its row until the transaction ends.
    pub(crate) async fn get_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account_id: &AccountId,
    ) -> Result<Option<StampTier>, sqlx::Error> {
        let record = query_as::<Postgres, TierRecord>(GET_TIER_FOR_UPDATE_SQL)
            .bind(account_id.as_str())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(record.map(StampTier::from))
    }

    pub(crate) async fn list_by_siebel(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        siebel_acct_id: &str,
    ) -> Result<Vec<StampTier>, sqlx::Error> {
        let records = query_as::<Postgres, TierRecord>(LIST_TIERS_BY_SIEBEL_SQL)
            .bind(siebel_acct_id)
            .fetch_all(&mut **tx)
            .await?;

        Ok(records.into_iter().map(StampTier::from).collect())
    }

    pub(crate) async fn list_by_level(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        level: u32,
    ) -> Result<Vec<StampTier>, sqlx::Error> {
        let records = query_as::<Postgres, TierRecord>(LIST_TIERS_BY_LEVEL_SQL)
            .bind(encode_u32(level, "tier_level")?)
            .fetch_all(&mut **tx)
            .await?;

        Ok(records.into_iter().map(StampTier::from).collect())
    }

    pub(crate) async fn list_open(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<StampTier>, sqlx::Error> {
        let records = query_as::<Postgres, TierRecord>(LIST_OPEN_TIERS_SQL)
            .fetch_all(&mut **tx)
            .await?;

        Ok(records.into_iter().map(StampTier::from).collect())
    }

    pub(crate) async fn update_stamp_count(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tier: &StampTier,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_STAMP_COUNT_SQL)
            .bind(tier.account_id().as_str())
            .bind(encode_u32(tier.current_count(), "current_stamp_count")?)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn save(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tier: &StampTier,
    ) -> Result<(), sqlx::Error> {
        query(SAVE_TIER_SQL)
            .bind(tier.account_id().as_str())
            .bind(tier.siebel_acct_id())
            .bind(encode_u32(tier.threshold(), "threshold")?)
            .bind(encode_u32(tier.level(), "tier_level")?)
            .bind(encode_u32(tier.current_count(), "current_stamp_count")?)
            .bind(encode_u32(tier.max_count(), "max_stamp_count")?)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Record a redemption as processed. Returns `false` if it already was.
    pub(crate) async fn record_processed_redemption(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        redemption: RedemptionUuid,
        promotion: PromotionUuid,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(RECORD_PROCESSED_REDEMPTION_SQL)
            .bind(redemption.into_uuid())
            .bind(promotion.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
