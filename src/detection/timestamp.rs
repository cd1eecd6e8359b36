//! Timestamp normalization
//!
//! Converts the timestamp encodings seen in access logs into milliseconds
//! since the unix epoch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::models::record::{parse_numeric, truncate_float};
use crate::models::RawTimestamp;

/// Numeric timestamps at or above this value are already in milliseconds
pub const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Normalize a raw timestamp to epoch milliseconds
///
/// Unparseable or missing values are treated as "now" so a malformed entry
/// never aborts the batch. Such entries will not cluster with real events.
pub fn normalize_timestamp(raw: &RawTimestamp) -> i64 {
    match try_normalize(raw) {
        Some(ms) => ms,
        None => {
            log::warn!("Unparseable timestamp {:?}, using current time", raw);
            Utc::now().timestamp_millis().max(0)
        }
    }
}

/// Normalize a raw timestamp, or `None` if it cannot be interpreted
pub fn try_normalize(raw: &RawTimestamp) -> Option<i64> {
    let ms = match raw {
        RawTimestamp::Integer(n) => from_numeric(*n),
        RawTimestamp::Float(f) => from_numeric(truncate_float(*f)?),
        RawTimestamp::Text(s) => match parse_numeric(s) {
            Some(n) => from_numeric(n),
            None => parse_date_time(s.trim())?.saturating_mul(1000),
        },
        RawTimestamp::Missing | RawTimestamp::Other(_) => return None,
    };
    Some(ms.max(0))
}

fn from_numeric(n: i64) -> i64 {
    if n >= MILLIS_THRESHOLD {
        n
    } else {
        n.saturating_mul(1000)
    }
}

/// Parse a date-time string into whole seconds since the epoch
///
/// Strings without an offset are taken as UTC.
fn parse_date_time(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.timestamp());
    }
    // Common Log Format: 10/Oct/2023:13:55:36 -0700
    if let Ok(dt) = DateTime::parse_from_str(s, "%d/%b/%Y:%H:%M:%S %z") {
        return Some(dt.timestamp());
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive).timestamp());
        }
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?).timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-10-22T10:00:00Z
    const BASE_SECS: i64 = 1_761_127_200;

    #[test]
    fn test_millis_unchanged() {
        let raw = RawTimestamp::Integer(1_697_123_456_789);
        assert_eq!(try_normalize(&raw), Some(1_697_123_456_789));

        let raw = RawTimestamp::Integer(MILLIS_THRESHOLD);
        assert_eq!(try_normalize(&raw), Some(MILLIS_THRESHOLD));
    }

    #[test]
    fn test_seconds_scaled() {
        let raw = RawTimestamp::Integer(1_729_594_800);
        assert_eq!(try_normalize(&raw), Some(1_729_594_800_000));

        let raw = RawTimestamp::Integer(MILLIS_THRESHOLD - 1);
        assert_eq!(try_normalize(&raw), Some((MILLIS_THRESHOLD - 1) * 1000));
    }

    #[test]
    fn test_numeric_strings_and_floats() {
        assert_eq!(try_normalize(&"1729594800".into()), Some(1_729_594_800_000));
        assert_eq!(try_normalize(&"1729594800000".into()), Some(1_729_594_800_000));
        assert_eq!(try_normalize(&RawTimestamp::Float(1_729_594_800.9)), Some(1_729_594_800_000));
    }

    #[test]
    fn test_iso_strings() {
        assert_eq!(try_normalize(&"2025-10-22T10:00:00Z".into()), Some(BASE_SECS * 1000));
        assert_eq!(try_normalize(&"2025-10-22T12:00:00+02:00".into()), Some(BASE_SECS * 1000));
        assert_eq!(try_normalize(&"2025-10-22 10:00:00".into()), Some(BASE_SECS * 1000));
        assert_eq!(try_normalize(&"2025-10-22T10:00:00".into()), Some(BASE_SECS * 1000));
    }

    #[test]
    fn test_fractional_seconds_truncated() {
        assert_eq!(try_normalize(&"2025-10-22T10:00:00.750Z".into()), Some(BASE_SECS * 1000));
    }

    #[test]
    fn test_other_date_formats() {
        assert_eq!(try_normalize(&"Wed, 22 Oct 2025 10:00:00 +0000".into()), Some(BASE_SECS * 1000));
        assert_eq!(try_normalize(&"22/Oct/2025:03:00:00 -0700".into()), Some(BASE_SECS * 1000));
        assert_eq!(try_normalize(&"2025-10-22".into()), Some((BASE_SECS - 10 * 3600) * 1000));
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(try_normalize(&"yesterday-ish".into()), None);
        assert_eq!(try_normalize(&RawTimestamp::Missing), None);
        assert_eq!(try_normalize(&RawTimestamp::Other(serde_json::Value::Bool(true))), None);
        assert_eq!(try_normalize(&RawTimestamp::Float(f64::NAN)), None);
    }

    #[test]
    fn test_fallback_is_plausible_now() {
        let before = Utc::now().timestamp_millis();
        let ms = normalize_timestamp(&RawTimestamp::Missing);
        let after = Utc::now().timestamp_millis();

        assert!(ms >= before && ms <= after);
    }

    #[test]
    fn test_never_negative() {
        assert_eq!(try_normalize(&RawTimestamp::Integer(-5)), Some(0));
        assert_eq!(try_normalize(&"1960-01-01T00:00:00Z".into()), Some(0));
    }

    #[test]
    fn test_mixed_encodings_comparable() {
        let iso = try_normalize(&"2024-10-22T11:00:00Z".into()).unwrap();
        let secs = try_normalize(&RawTimestamp::Integer(1_729_594_800)).unwrap();
        let millis = try_normalize(&RawTimestamp::Integer(1_729_594_800_000)).unwrap();

        assert_eq!(secs, millis);
        assert_eq!(iso, millis);
    }
}
