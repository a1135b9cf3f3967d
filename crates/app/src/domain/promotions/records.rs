//! Promotion Records

use estamp::{
    promotions::{
        DisplayType, Promotion, PromotionStatus, PromotionTag, PromotionUuid, RedemptionLimits,
    },
    rewards::Reward,
};
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Row, postgres::PgRow};

use crate::domain::columns::decode_optional_u32;

/// Promotion Record, without its rewards
#[derive(Debug, Clone)]
pub struct PromotionRecord {
    pub uuid: PromotionUuid,
    pub status: PromotionStatus,
    pub suspended: bool,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub priority: i32,
    pub limits: RedemptionLimits,
    pub tag: Option<PromotionTag>,
    pub coupon_code: Option<String>,
}

impl PromotionRecord {
    /// Attach rewards to produce the domain promotion.
    pub fn into_promotion(self, rewards: Vec<Reward>) -> Promotion {
        Promotion {
            uuid: self.uuid,
            status: self.status,
            suspended: self.suspended,
            start_date: self.start_date,
            end_date: self.end_date,
            priority: self.priority,
            limits: self.limits,
            tag: self.tag,
            coupon_code: self.coupon_code,
            rewards,
        }
    }
}

impl<'r> FromRow<'r, PgRow> for PromotionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        let status = status
            .parse::<PromotionStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        let tag_code: Option<String> = row.try_get("tag_code")?;
        let tag_display_type: Option<String> = row.try_get("tag_display_type")?;

        let tag = tag_code.map(|code| PromotionTag {
            code,
            display_type: DisplayType::from(tag_display_type.unwrap_or_default()),
        });

        Ok(Self {
            uuid: PromotionUuid::from_uuid(row.try_get("uuid")?),
            status,
            suspended: row.try_get("suspended")?,
            start_date: row
                .try_get::<Option<SqlxTimestamp>, _>("start_date")?
                .map(SqlxTimestamp::to_jiff),
            end_date: row
                .try_get::<Option<SqlxTimestamp>, _>("end_date")?
                .map(SqlxTimestamp::to_jiff),
            priority: row.try_get("priority")?,
            limits: RedemptionLimits {
                per_user: decode_optional_u32(row, "max_redemption_per_user")?,
                total: decode_optional_u32(row, "total_redemption_limit")?,
            },
            tag,
            coupon_code: row.try_get("coupon_code")?,
        })
    }
}
