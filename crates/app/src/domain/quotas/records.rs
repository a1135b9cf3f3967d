//! Raw Quota Records

use estamp::{accounts::AccountId, identity::CustomerUuid, quotas::RawQuotaRow};
use sqlx::{FromRow, Row, postgres::PgRow};
use uuid::Uuid;

use crate::domain::columns::decode_optional_u32;

/// One row of the raw quota join.
#[derive(Debug, Clone)]
pub struct RawQuotaRecord(pub RawQuotaRow);

impl From<RawQuotaRecord> for RawQuotaRow {
    fn from(record: RawQuotaRecord) -> Self {
        record.0
    }
}

impl<'r> FromRow<'r, PgRow> for RawQuotaRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let account_id: Option<String> = row.try_get("account_id")?;
        let redeemer: Option<Uuid> = row.try_get("redeemer_uuid")?;

        Ok(Self(RawQuotaRow {
            account_id: account_id.map(AccountId::from),
            siebel_acct_id: row.try_get("siebel_acct_id")?,
            threshold: decode_optional_u32(row, "threshold")?,
            redeemer: redeemer.map(CustomerUuid::from_uuid),
        }))
    }
}
