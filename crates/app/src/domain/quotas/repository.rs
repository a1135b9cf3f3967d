//! Raw Quota Repository

use estamp::{
    identity::{CatalogVersionUuid, CustomerUuid},
    promotions::PromotionUuid,
    quotas::RawQuotaRow,
};
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Postgres, Transaction, query_as, query_scalar};

use crate::domain::quotas::records::RawQuotaRecord;

const FETCH_RAW_QUOTA_SQL: &str = include_str!("sql/fetch_raw_quota.sql");
const COUNT_REDEMPTIONS_SQL: &str = include_str!("sql/count_redemptions.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgQuotaRepository;

impl PgQuotaRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn fetch_raw_quota(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
        catalog_version: CatalogVersionUuid,
        as_of: Timestamp,
    ) -> Result<Vec<RawQuotaRow>, sqlx::Error> {
        let records = query_as::<Postgres, RawQuotaRecord>(FETCH_RAW_QUOTA_SQL)
            .bind(customer.into_uuid())
            .bind(catalog_version.into_uuid())
            .bind(SqlxTimestamp::from(as_of))
            .fetch_all(&mut **tx)
            .await?;

        Ok(records.into_iter().map(RawQuotaRow::from).collect())
    }

    pub(crate) async fn count_redemptions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotion: PromotionUuid,
        customer: CustomerUuid,
    ) -> Result<i64, sqlx::Error> {
        query_scalar::<Postgres, i64>(COUNT_REDEMPTIONS_SQL)
            .bind(promotion.into_uuid())
            .bind(customer.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }
}
