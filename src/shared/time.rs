//! Timestamp parsing and canonical formatting.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use super::error::AppError;

/// Parse a caller-supplied instant.
///
/// Accepts RFC 3339 (`2025-09-01T13:35:00-04:00`), RFC 2822, a naive
/// date-time (read as local time), a bare date (read as UTC midnight) or
/// epoch milliseconds.
pub fn parse_instant(input: &str) -> Result<DateTime<Utc>, AppError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, pattern) {
            if let Some(local) = Local.from_local_datetime(&naive).earliest() {
                return Ok(local.with_timezone(&Utc));
            }
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }
    if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
        if let Some(dt) = input
            .parse::<i64>()
            .ok()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        {
            return Ok(dt);
        }
    }

    Err(AppError::TimestampParse(input.to_string()))
}

/// Canonical instant string: UTC with millisecond precision,
/// e.g. `2025-09-01T17:35:00.000Z`.
pub fn canonical(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
