//! Tier Records

use estamp::{accounts::AccountId, tiers::StampTier};
use sqlx::{FromRow, Row, postgres::PgRow};

use crate::domain::columns::decode_u32;

/// Tier Record
#[derive(Debug, Clone)]
pub struct TierRecord(pub StampTier);

impl From<TierRecord> for StampTier {
    fn from(record: TierRecord) -> Self {
        record.0
    }
}

impl<'r> FromRow<'r, PgRow> for TierRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let account_id: String = row.try_get("account_id")?;
        let siebel_acct_id: String = row.try_get("siebel_acct_id")?;

        Ok(Self(StampTier::new(
            AccountId::from(account_id),
            siebel_acct_id,
            decode_u32(row, "threshold")?,
            decode_u32(row, "tier_level")?,
            decode_u32(row, "current_stamp_count")?,
            decode_u32(row, "max_stamp_count")?,
        )))
    }
}
