//! Promotions Repository

use estamp::{
    identity::CatalogVersionUuid,
    promotions::{Promotion, PromotionStatus, PromotionTag, PromotionUuid},
};
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Postgres, Transaction, query, query_as, query_scalar};
use uuid::Uuid;

use crate::domain::{
    columns::{bind_limit, encode_optional_u32},
    promotions::records::PromotionRecord,
};

const GET_PROMOTION_SQL: &str = include_str!("sql/get_promotion.sql");
const LIST_PROMOTIONS_BY_STATUS_SQL: &str = include_str!("sql/list_promotions_by_status.sql");
const LIST_ACTIVE_PROMOTIONS_SQL: &str = include_str!("sql/list_active_promotions.sql");
const LIST_ACTIVE_UNSUSPENDED_PROMOTIONS_SQL: &str =
    include_str!("sql/list_active_unsuspended_promotions.sql");
const LIST_PROMOTIONS_BY_TAG_CODE_SQL: &str = include_str!("sql/list_promotions_by_tag_code.sql");
const LIST_EXPIRED_PROMOTIONS_SQL: &str = include_str!("sql/list_expired_promotions.sql");
const LIST_REMOVABLE_PROMOTIONS_SQL: &str = include_str!("sql/list_removable_promotions.sql");
const LIST_PROMOTIONS_BY_DATE_RANGE_SQL: &str =
    include_str!("sql/list_promotions_by_date_range.sql");
const LIST_PROMOTIONS_FOR_CATALOG_VERSION_SQL: &str =
    include_str!("sql/list_promotions_for_catalog_version.sql");
const UPSERT_PROMOTION_TAG_SQL: &str = include_str!("sql/upsert_promotion_tag.sql");
const CREATE_PROMOTION_SQL: &str = include_str!("sql/create_promotion.sql");
const UPDATE_PROMOTION_STATUS_SQL: &str = include_str!("sql/update_promotion_status.sql");
const SET_PROMOTION_SUSPENDED_SQL: &str = include_str!("sql/set_promotion_suspended.sql");
const MARK_PROMOTIONS_EXPIRED_SQL: &str = include_str!("sql/mark_promotions_expired.sql");
const DELETE_PROMOTION_SQL: &str = include_str!("sql/delete_promotion.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPromotionsRepository;

impl PgPromotionsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotion: PromotionUuid,
    ) -> Result<Option<PromotionRecord>, sqlx::Error> {
        query_as::<Postgres, PromotionRecord>(GET_PROMOTION_SQL)
            .bind(promotion.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_by_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        status: PromotionStatus,
    ) -> Result<Vec<PromotionRecord>, sqlx::Error> {
        query_as::<Postgres, PromotionRecord>(LIST_PROMOTIONS_BY_STATUS_SQL)
            .bind(status.as_str())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_active(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        point_in_time: Timestamp,
        include_suspended: bool,
    ) -> Result<Vec<PromotionRecord>, sqlx::Error> {
        let sql = if include_suspended {
            LIST_ACTIVE_PROMOTIONS_SQL
        } else {
            LIST_ACTIVE_UNSUSPENDED_PROMOTIONS_SQL
        };

        query_as::<Postgres, PromotionRecord>(sql)
            .bind(SqlxTimestamp::from(point_in_time))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_by_tag_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Vec<PromotionRecord>, sqlx::Error> {
        query_as::<Postgres, PromotionRecord>(LIST_PROMOTIONS_BY_TAG_CODE_SQL)
            .bind(code)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_expired(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        point_in_time: Timestamp,
        limit: usize,
    ) -> Result<Vec<PromotionRecord>, sqlx::Error> {
        query_as::<Postgres, PromotionRecord>(LIST_EXPIRED_PROMOTIONS_SQL)
            .bind(SqlxTimestamp::from(point_in_time))
            .bind(bind_limit(limit))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_removable(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cutoff: Timestamp,
        limit: usize,
    ) -> Result<Vec<PromotionRecord>, sqlx::Error> {
        query_as::<Postgres, PromotionRecord>(LIST_REMOVABLE_PROMOTIONS_SQL)
            .bind(SqlxTimestamp::from(cutoff))
            .bind(bind_limit(limit))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_by_date_range(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<PromotionRecord>, sqlx::Error> {
        query_as::<Postgres, PromotionRecord>(LIST_PROMOTIONS_BY_DATE_RANGE_SQL)
            .bind(SqlxTimestamp::from(from))
            .bind(SqlxTimestamp::from(to))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_for_catalog_version(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        catalog_version: CatalogVersionUuid,
        point_in_time: Timestamp,
    ) -> Result<Vec<PromotionRecord>, sqlx::Error> {
        query_as::<Postgres, PromotionRecord>(LIST_PROMOTIONS_FOR_CATALOG_VERSION_SQL)
            .bind(catalog_version.into_uuid())
            .bind(SqlxTimestamp::from(point_in_time))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn upsert_tag(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tag: &PromotionTag,
    ) -> Result<Uuid, sqlx::Error> {
        query_scalar::<Postgres, Uuid>(UPSERT_PROMOTION_TAG_SQL)
            .bind(Uuid::now_v7())
            .bind(tag.code.as_str())
            .bind(tag.display_type.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotion: &Promotion,
        tag: Option<Uuid>,
    ) -> Result<(), sqlx::Error> {
        let per_user = encode_optional_u32(promotion.limits.per_user, "max_redemption_per_user")?;
        let total = encode_optional_u32(promotion.limits.total, "total_redemption_limit")?;

        query(CREATE_PROMOTION_SQL)
            .bind(promotion.uuid.into_uuid())
            .bind(tag)
            .bind(promotion.status.as_str())
            .bind(promotion.suspended)
            .bind(promotion.start_date.map(SqlxTimestamp::from))
            .bind(promotion.end_date.map(SqlxTimestamp::from))
            .bind(promotion.priority)
            .bind(per_user)
            .bind(total)
            .bind(promotion.coupon_code.as_deref())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotion: PromotionUuid,
        status: PromotionStatus,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_PROMOTION_STATUS_SQL)
            .bind(promotion.into_uuid())
            .bind(status.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn set_suspended(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotion: PromotionUuid,
        suspended: bool,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_PROMOTION_SUSPENDED_SQL)
            .bind(promotion.into_uuid())
            .bind(suspended)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn mark_expired(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotions: &[PromotionUuid],
    ) -> Result<u64, sqlx::Error> {
        if promotions.is_empty() {
            return Ok(0);
        }

        let uuids: Vec<Uuid> = promotions.iter().map(|p| p.into_uuid()).collect();

        let rows_affected = query(MARK_PROMOTIONS_EXPIRED_SQL)
            .bind(uuids)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotion: PromotionUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PROMOTION_SQL)
            .bind(promotion.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}
