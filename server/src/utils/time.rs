//! Time utility functions

use chrono::{DateTime, Timelike, Utc};

/// Render a timestamp as `YYYY-MM-DD HH:MM:SS[.fffffffff] +0000 UTC`.
///
/// The fractional part is omitted when zero and otherwise trimmed of
/// trailing zeros.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    let base = ts.format("%Y-%m-%d %H:%M:%S").to_string();
    let nanos = ts.nanosecond() % 1_000_000_000;
    if nanos == 0 {
        return format!("{base} +0000 UTC");
    }
    let frac = format!("{nanos:09}");
    format!("{base}.{} +0000 UTC", frac.trim_end_matches('0'))
}

/// Convert milliseconds since Unix epoch to DateTime<Utc>
#[cfg(test)]
pub fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).expect("millis within chrono range")
}

/// Parse an RFC 3339 timestamp string to DateTime<Utc>
pub fn parse_rfc3339(ts: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(ts).map(|dt| dt.with_timezone(&Utc))
}
