//! Test Helpers
//!
//! Seeds the commerce-side tables the quota reader joins against. Those
//! tables are owned by the surrounding platform, so no service writes them.

use estamp::{
    identity::{CatalogVersionUuid, CustomerUuid},
    promotions::PromotionUuid,
};
use jiff::{SignedDuration, Timestamp};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::query;
use uuid::Uuid;

use crate::test::TestContext;

/// An active e-stamp promotion stamping one account, covering one product.
///
/// Every field defaults to a value the quota reader accepts, so a test can
/// break exactly one filter condition.
#[derive(Debug, Clone)]
pub(crate) struct EstampSeed {
    pub account_id: String,
    pub threshold: u32,
    pub max_redemption_per_user: Option<u32>,
    pub catalog_version: CatalogVersionUuid,
    pub display_type: &'static str,
    pub reward_type: &'static str,
    pub status: &'static str,
    pub suspended: bool,
    pub start: Timestamp,
    pub end: Timestamp,
    pub activity_start: Timestamp,
    pub activity_end: Timestamp,
    pub online_date: Option<Timestamp>,
    pub offline_date: Option<Timestamp>,
    pub bucket_items: u32,
}

impl EstampSeed {
    /// Promotion and activity both run from a day before `now` to a week after it.
    pub(crate) fn new(
        account_id: &str,
        threshold: u32,
        now: Timestamp,
    ) -> Result<Self, jiff::Error> {
        let start = now.checked_sub(SignedDuration::from_hours(24))?;
        let end = now.checked_add(SignedDuration::from_hours(24 * 7))?;

        Ok(Self {
            account_id: account_id.to_string(),
            threshold,
            max_redemption_per_user: None,
            catalog_version: CatalogVersionUuid::new(),
            display_type: "estamp",
            reward_type: "increase_member_account",
            status: "active",
            suspended: false,
            start,
            end,
            activity_start: start,
            activity_end: end,
            online_date: None,
            offline_date: None,
            bucket_items: 1,
        })
    }
}

fn as_integer(value: u32) -> i32 {
    i32::try_from(value).expect("seed value fits an INTEGER column")
}

#[derive(Debug, Clone)]
pub(crate) struct Seeded {
    pub promotion: PromotionUuid,
    pub catalog_version: CatalogVersionUuid,
    pub coupon: Uuid,
}

pub(crate) async fn seed_estamp_promotion(
    ctx: &TestContext,
    seed: EstampSeed,
) -> Result<Seeded, sqlx::Error> {
    let mut tx = ctx.pool.begin().await?;

    let promotion = PromotionUuid::new();
    let catalog_version = seed.catalog_version;
    let coupon = Uuid::now_v7();
    let tag = Uuid::now_v7();
    let bucket = Uuid::now_v7();
    let code = format!("COUPON_{}", coupon.simple());
    let start = SqlxTimestamp::from(seed.start);
    let end = SqlxTimestamp::from(seed.end);

    query("INSERT INTO promotion_tags (uuid, code, display_type) VALUES ($1, $2, $3)")
        .bind(tag)
        .bind(format!("tag_{}", tag.simple()))
        .bind(seed.display_type)
        .execute(&mut *tx)
        .await?;

    query(
        "INSERT INTO promotions \
           (uuid, tag_uuid, status, suspended, start_date, end_date, \
            max_redemption_per_user, coupon_code) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(promotion.into_uuid())
    .bind(tag)
    .bind(seed.status)
    .bind(seed.suspended)
    .bind(start)
    .bind(end)
    .bind(seed.max_redemption_per_user.map(as_integer))
    .bind(&code)
    .execute(&mut *tx)
    .await?;

    query(
        "INSERT INTO rewards (uuid, promotion_uuid, reward_type, account_id) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::now_v7())
    .bind(promotion.into_uuid())
    .bind(seed.reward_type)
    .bind(&seed.account_id)
    .execute(&mut *tx)
    .await?;

    query("INSERT INTO coupons (uuid, code) VALUES ($1, $2)")
        .bind(coupon)
        .bind(&code)
        .execute(&mut *tx)
        .await?;

    query(
        "INSERT INTO promotion_activities (uuid, promotion_uuid, start_time, end_time) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::now_v7())
    .bind(promotion.into_uuid())
    .bind(SqlxTimestamp::from(seed.activity_start))
    .bind(SqlxTimestamp::from(seed.activity_end))
    .execute(&mut *tx)
    .await?;

    query("INSERT INTO buckets (uuid, promotion_uuid) VALUES ($1, $2)")
        .bind(bucket)
        .bind(promotion.into_uuid())
        .execute(&mut *tx)
        .await?;

    for item in 0..seed.bucket_items {
        let item_code = format!("ITEM_{}_{item}", bucket.simple());

        query("INSERT INTO promo_items (uuid, bucket_uuid, item_code) VALUES ($1, $2, $3)")
            .bind(Uuid::now_v7())
            .bind(bucket)
            .bind(&item_code)
            .execute(&mut *tx)
            .await?;

        query(
            "INSERT INTO products (uuid, code, catalog_version_uuid, online_date, offline_date) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::now_v7())
        .bind(&item_code)
        .bind(catalog_version.into_uuid())
        .bind(seed.online_date.map(SqlxTimestamp::from))
        .bind(seed.offline_date.map(SqlxTimestamp::from))
        .execute(&mut *tx)
        .await?;
    }

    query(
        "INSERT INTO estamp_tiers (account_id, siebel_acct_id, threshold, max_stamp_count) \
         VALUES ($1, $2, $3, $4) ON CONFLICT (account_id) DO NOTHING",
    )
    .bind(&seed.account_id)
    .bind(format!("SBL_{}", seed.account_id))
    .bind(as_integer(seed.threshold))
    .bind(as_integer(seed.threshold))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Seeded {
        promotion,
        catalog_version,
        coupon,
    })
}

pub(crate) async fn seed_redemption(
    ctx: &TestContext,
    seeded: &Seeded,
    customer: CustomerUuid,
) -> Result<(), sqlx::Error> {
    query("INSERT INTO coupon_redemptions (uuid, coupon_uuid, customer_uuid) VALUES ($1, $2, $3)")
        .bind(Uuid::now_v7())
        .bind(seeded.coupon)
        .bind(customer.into_uuid())
        .execute(&ctx.pool)
        .await?;

    Ok(())
}
