//! Payload normalization: metric name case-folding and timestamp canonicalization.
//!
//! Canonical instants are RFC 3339 in UTC with a `Z` suffix and only as many
//! fractional digits as the input carried (`2024-01-01T00:00:00Z`).
//!
//! Accepted timestamp inputs:
//! - RFC 3339 (`2024-01-01T00:00:00Z`, `2024-01-01T02:00:00+02:00`)
//! - offset without colon (`2024-01-01T00:00:00+0000`)
//! - naive date-time, `T` or space separated, seconds optional (read as UTC)
//! - bare date (UTC midnight)
//! - Unix epoch, only as a JSON number; magnitudes above
//!   `EPOCH_MILLIS_THRESHOLD` are read as milliseconds.
//!
//! Strings of digits (`"20240101"`, `"1704067200"`) are not epochs: they are
//! kept verbatim or rejected like any other unrecognized text.
//!
//! What happens to anything else is decided by [`TimestampPolicy`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, TsGateError};
use crate::model::scalar_to_string;

/// Above this absolute value an epoch number is taken as milliseconds.
pub const EPOCH_MILLIS_THRESHOLD: f64 = 2e10;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// What to do with a timestamp that does not describe an instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPolicy {
    /// Keep the raw text and carry on (the batch is never rejected).
    #[default]
    Lenient,
    /// Reject with [`TsGateError::InvalidTimestamp`].
    Strict,
}

/// Canonical lowercase form of a metric name.
pub fn normalize_metric_name(name: &str) -> String {
    name.to_lowercase()
}

/// Render an instant in canonical form.
pub fn canonical_instant(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse a timestamp string into an instant, if it describes one.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

fn instant_from_epoch(n: f64) -> Option<DateTime<Utc>> {
    if !n.is_finite() {
        return None;
    }
    let secs = if n.abs() > EPOCH_MILLIS_THRESHOLD { n / 1000.0 } else { n };
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round() as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
}

/// Parse a JSON timestamp (string or number) into an instant.
pub fn parse_instant_value(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::String(s) => parse_instant(s),
        Value::Number(n) => n.as_f64().and_then(instant_from_epoch),
        _ => None,
    }
}

/// Normalize a submitted timestamp to its canonical string.
///
/// Under [`TimestampPolicy::Lenient`] an input that yields no instant falls
/// back to its raw text representation.
pub fn normalize_timestamp(raw: &Value, policy: TimestampPolicy) -> Result<String> {
    match parse_instant_value(raw) {
        Some(dt) => Ok(canonical_instant(&dt)),
        None => fallback(scalar_to_string(raw), policy),
    }
}

/// String flavour of [`normalize_timestamp`], used for query bounds.
pub fn normalize_timestamp_str(raw: &str, policy: TimestampPolicy) -> Result<String> {
    match parse_instant(raw) {
        Some(dt) => Ok(canonical_instant(&dt)),
        None => fallback(raw.to_string(), policy),
    }
}

fn fallback(raw: String, policy: TimestampPolicy) -> Result<String> {
    match policy {
        TimestampPolicy::Lenient => Ok(raw),
        TimestampPolicy::Strict => Err(TsGateError::InvalidTimestamp(raw)),
    }
}
