//! Domain models.
//!
//! These are internal domain models, distinct from the API response types
//! (which carry `#[serde(rename_all = "camelCase")]` and string timestamps).

pub mod auth;
pub mod decision;
pub mod workspace;

use chrono::{DateTime, Utc};

/// Current instant as stored in the database (microseconds since the epoch).
pub fn now_micros() -> i64 {
    Utc::now().timestamp_micros()
}

/// Convert a stored microsecond timestamp back into a `DateTime<Utc>`.
///
/// Out-of-range values collapse to the Unix epoch.
pub fn from_micros(micros: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(micros).unwrap_or_default()
}
