//! Reward Records

use estamp::{
    accounts::AccountId,
    promotions::PromotionUuid,
    rewards::{Reward, RewardType, RewardUuid},
};
use sqlx::{FromRow, Row, postgres::PgRow};

use crate::domain::columns::decode_optional_u32;

/// Reward Record
#[derive(Debug, Clone)]
pub struct RewardRecord {
    pub uuid: RewardUuid,
    pub promotion: PromotionUuid,
    pub reward_type: String,
    pub account_id: Option<String>,
    pub value: Option<u32>,
}

impl From<RewardRecord> for Reward {
    fn from(record: RewardRecord) -> Self {
        Self {
            uuid: record.uuid,
            promotion: record.promotion,
            kind: RewardType::from(record.reward_type),
            account_id: record.account_id.map(AccountId::from),
            value: record.value,
        }
    }
}

impl<'r> FromRow<'r, PgRow> for RewardRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: RewardUuid::from_uuid(row.try_get("uuid")?),
            promotion: PromotionUuid::from_uuid(row.try_get("promotion_uuid")?),
            reward_type: row.try_get("reward_type")?,
            account_id: row.try_get("account_id")?,
            value: decode_optional_u32(row, "reward_value")?,
        })
    }
}
