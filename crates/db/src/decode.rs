//! Column decoding helpers shared by the query modules

use std::str::FromStr;

use sqlx::postgres::PgRow;
use sqlx::Row;

/// Decode a TEXT column into one of the model enums
pub(crate) fn parse<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: String| sqlx::Error::Decode(e.into()))
}

/// Decode a nullable TEXT column into one of the model enums
pub(crate) fn parse_opt<T>(row: &PgRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: FromStr<Err = String>,
{
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|s| s.parse().map_err(|e: String| sqlx::Error::Decode(e.into())))
        .transpose()
}

/// Read a non-negative INT column
pub(crate) fn count(row: &PgRow, column: &str) -> Result<u32, sqlx::Error> {
    let value: i32 = row.try_get(column)?;
    Ok(value.max(0) as u32)
}
