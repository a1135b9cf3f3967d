//! Integer column conversions.
//!
//! Counts and limits are `u32` in the domain and `INTEGER` in storage. Values
//! that do not fit surface as column decode errors.

use sqlx::{Error, Row, postgres::PgRow};

pub(crate) fn encode_u32(value: u32, column: &str) -> Result<i32, Error> {
    i32::try_from(value).map_err(|e| Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn encode_optional_u32(value: Option<u32>, column: &str) -> Result<Option<i32>, Error> {
    value.map(|v| encode_u32(v, column)).transpose()
}

pub(crate) fn decode_u32(row: &PgRow, column: &str) -> Result<u32, Error> {
    let value: i32 = row.try_get(column)?;

    u32::try_from(value).map_err(|e| Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn decode_optional_u32(row: &PgRow, column: &str) -> Result<Option<u32>, Error> {
    let value: Option<i32> = row.try_get(column)?;

    value
        .map(|v| {
            u32::try_from(v).map_err(|e| Error::ColumnDecode {
                index: column.to_string(),
                source: Box::new(e),
            })
        })
        .transpose()
}

pub(crate) fn bind_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
