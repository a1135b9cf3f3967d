//! Account quota service.

use async_trait::async_trait;
use estamp::{
    identity::{CatalogVersionUuid, CustomerUuid},
    promotions::PromotionUuid,
    quotas::{AccountQuotas, RawQuotaRow, aggregate},
};
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, debug};

use crate::{
    database::Db,
    domain::quotas::{errors::QuotaServiceError, repository::PgQuotaRepository},
};

#[derive(Debug, Clone)]
pub struct PgAccountQuotaService {
    db: Db,
    repository: PgQuotaRepository,
}

impl PgAccountQuotaService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgQuotaRepository::new(),
        }
    }
}

#[async_trait]
impl AccountQuotaService for PgAccountQuotaService {
    #[tracing::instrument(
        name = "quotas.service.fetch_raw_quota",
        skip(self),
        fields(
            customer_uuid = %customer,
            catalog_version_uuid = %catalog_version,
            row_count = tracing::field::Empty
        ),
        err
    )]
    async fn fetch_raw_quota(
        &self,
        customer: CustomerUuid,
        catalog_version: CatalogVersionUuid,
        as_of: Timestamp,
    ) -> Result<Vec<RawQuotaRow>, QuotaServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows = self
            .repository
            .fetch_raw_quota(&mut tx, customer, catalog_version, as_of)
            .await?;

        tx.commit().await?;

        Span::current().record("row_count", rows.len());

        Ok(rows)
    }

    #[tracing::instrument(
        name = "quotas.service.get_account_quotas",
        skip(self),
        fields(
            customer_uuid = %customer,
            catalog_version_uuid = %catalog_version,
            quota_count = tracing::field::Empty
        ),
        err
    )]
    async fn get_account_quotas(
        &self,
        customer: CustomerUuid,
        catalog_version: CatalogVersionUuid,
        as_of: Timestamp,
    ) -> Result<AccountQuotas, QuotaServiceError> {
        let rows = self
            .fetch_raw_quota(customer, catalog_version, as_of)
            .await?;

        let quotas = aggregate(&rows);

        Span::current().record("quota_count", quotas.len());

        debug!(row_count = rows.len(), "aggregated account quotas");

        Ok(quotas)
    }

    #[tracing::instrument(
        name = "quotas.service.get_redemption_count",
        skip(self),
        fields(promotion_uuid = %promotion, customer_uuid = %customer),
        err
    )]
    async fn get_redemption_count(
        &self,
        promotion: PromotionUuid,
        customer: CustomerUuid,
    ) -> Result<u32, QuotaServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let count = self
            .repository
            .count_redemptions(&mut tx, promotion, customer)
            .await?;

        tx.commit().await?;

        Ok(u32::try_from(count)?)
    }
}

#[automock]
#[async_trait]
pub trait AccountQuotaService: Send + Sync {
    /// Raw quota rows for a customer and catalog version at `as_of`, ordered by
    /// account.
    async fn fetch_raw_quota(
        &self,
        customer: CustomerUuid,
        catalog_version: CatalogVersionUuid,
        as_of: Timestamp,
    ) -> Result<Vec<RawQuotaRow>, QuotaServiceError>;

    /// Per-account quota usage for a customer and catalog version at `as_of`.
    async fn get_account_quotas(
        &self,
        customer: CustomerUuid,
        catalog_version: CatalogVersionUuid,
        as_of: Timestamp,
    ) -> Result<AccountQuotas, QuotaServiceError>;

    /// Redemptions of a promotion's coupon by a customer; 0 when none.
    async fn get_redemption_count(
        &self,
        promotion: PromotionUuid,
        customer: CustomerUuid,
    ) -> Result<u32, QuotaServiceError>;
}
