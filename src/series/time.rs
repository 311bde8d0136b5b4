//! Date and instant parsing for sample timestamps.
//!
//! All calendar arithmetic happens in UTC so a chart renders the same grid
//! regardless of the host time zone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::error::SeriesError;

pub const DAY_FORMAT: &str = "%Y-%m-%d";

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Calendar day of a `YYYY-MM-DD` date or a timestamp starting with one.
pub fn calendar_day(date: &str) -> Option<NaiveDate> {
    let day = date.trim().get(..10)?;
    NaiveDate::parse_from_str(day, DAY_FORMAT).ok()
}

/// Parse a `YYYY-MM-DD` string, rejecting trailing time components.
pub fn parse_day(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DAY_FORMAT).ok()
}

/// Like `parse_day`, for user-supplied bounds that must be valid.
pub fn require_day(date: &str) -> Result<NaiveDate, SeriesError> {
    parse_day(date).ok_or_else(|| SeriesError::InvalidDate(date.to_string()))
}

pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// True when the date string carries a time of day after the calendar day.
pub fn has_time_component(date: &str) -> bool {
    matches!(date.trim().as_bytes().get(10), Some(b'T') | Some(b't') | Some(b' '))
}

/// Parse a sample timestamp to an absolute instant.
///
/// Accepts RFC 3339, offset-less timestamps (read as UTC) and bare calendar
/// days (UTC midnight).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    parse_day(raw).and_then(start_of_day)
}

pub fn start_of_day(day: NaiveDate) -> Option<DateTime<Utc>> {
    day.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

/// The last millisecond of the given day.
pub fn end_of_day(day: NaiveDate) -> Option<DateTime<Utc>> {
    day.and_hms_milli_opt(23, 59, 59, 999)
        .map(|naive| naive.and_utc())
}

/// ISO-8601 UTC string with millisecond precision, e.g. `2024-01-01T10:00:00.000Z`.
pub fn iso_millis(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_day_truncates_timestamps() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(calendar_day("2024-01-03"), Some(day));
        assert_eq!(calendar_day("2024-01-03T23:10:00+02:00"), Some(day));
        assert_eq!(calendar_day("yesterday"), None);
    }

    #[test]
    fn test_require_day_reports_invalid_date() {
        assert_eq!(
            require_day(" 2024-02-29 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        let err = require_day("2023-02-29").unwrap_err();
        assert!(matches!(err, SeriesError::InvalidDate(ref d) if d == "2023-02-29"));
        assert!(!err.is_retryable());
        assert!(require_day("2024-01-01T10:00:00").is_err());
    }

    #[test]
    fn test_has_time_component() {
        assert!(has_time_component("2024-01-01T10:00:00Z"));
        assert!(has_time_component("2024-01-01 10:00:00"));
        assert!(!has_time_component("2024-01-01"));
        assert!(!has_time_component(""));
    }

    #[test]
    fn test_parse_instant_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
            .and_utc();
        assert_eq!(parse_instant("2024-01-01T10:00:00Z"), Some(expected));
        assert_eq!(parse_instant("2024-01-01T12:00:00+02:00"), Some(expected));
        assert_eq!(parse_instant("2024-01-01T10:00:00"), Some(expected));
        assert_eq!(parse_instant("2024-01-01 10:00:00.000"), Some(expected));
        assert_eq!(
            parse_instant("2024-01-01"),
            start_of_day(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
        assert_eq!(parse_instant("garbage"), None);
    }

    #[test]
    fn test_end_of_day_is_just_before_midnight() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let end = end_of_day(day).unwrap();
        let next = start_of_day(day.succ_opt().unwrap()).unwrap();
        assert_eq!((next - end).num_milliseconds(), 1);
    }

    #[test]
    fn test_iso_millis_matches_js_format() {
        let instant = parse_instant("2024-01-01T10:02:30Z").unwrap();
        assert_eq!(iso_millis(instant), "2024-01-01T10:02:30.000Z");
    }
}
