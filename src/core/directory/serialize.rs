//! SQLite serialization for typed enums and timestamps
//!
//! Implements ToSql and FromSql for the record enums so they are stored
//! as their wire strings (`IN_PROGRESS`, `TECHNICIAN`, ...).

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::core::entity::{AssetStatus, Priority};
use crate::entities::request::{RequestType, Stage};
use crate::entities::user::Role;

fn invalid(message: String) -> FromSqlError {
    FromSqlError::Other(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    )))
}

macro_rules! sql_text_enum {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToSql for $ty {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.as_str()))
                }
            }

            impl FromSql for $ty {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    value.as_str()?.parse().map_err(invalid)
                }
            }
        )+
    };
}

sql_text_enum!(Role, Stage, Priority, RequestType, AssetStatus);

// =========================================================================
// Timestamps
// =========================================================================

/// Fixed-width RFC 3339 form, so stored timestamps sort lexically
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("Invalid timestamp '{}': {}", s, e))
}

/// Start of the given day, in stored form
pub fn day_start(day: NaiveDate) -> String {
    format_timestamp(&day.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
}

/// Start of the day after the given day, in stored form
pub fn day_after(day: NaiveDate) -> String {
    let next = day.succ_opt().unwrap_or(day);
    day_start(next)
}

/// Column wrapper for timestamps stored as text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp(pub DateTime<Utc>);

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(format_timestamp(&self.0)))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        parse_timestamp(value.as_str()?)
            .map(Timestamp)
            .map_err(invalid)
    }
}
