//! Instant parsing and day arithmetic for record time columns.
//!
//! Exported clinical records carry timestamps in several ISO 8601 shapes:
//! with or without seconds, with a `T` or a space separator, with a UTC
//! offset, or as a bare date. All of them are read into a naive UTC
//! [`NaiveDateTime`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use polars::prelude::{AnyValue, DataFrame};

use ehr_common::{any_to_string, is_missing_text};
use ehr_model::CUTOFF_TIME_FORMAT;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses an instant, returning `None` for blanks, sentinels and garbage.
///
/// Offsets are applied, so `2018-09-20T02:00:00+02:00` reads as midnight UTC.
///
/// # Examples
///
/// ```
/// use ehr_core::datetime::parse_instant;
///
/// let a = parse_instant("2018-09-20T00:12").unwrap();
/// let b = parse_instant("2018-09-20 00:12:00").unwrap();
/// assert_eq!(a, b);
/// assert!(parse_instant("unknown").is_none());
/// ```
pub fn parse_instant(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if is_missing_text(trimmed) {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Renders an instant the way cutoff tables carry it.
pub fn format_instant(value: NaiveDateTime) -> String {
    value.format(CUTOFF_TIME_FORMAT).to_string()
}

/// Whole days from `start` to `end`, truncated toward zero.
///
/// Twelve minutes is zero days; minus thirty hours is minus one day.
pub fn whole_days_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end - start).num_days()
}

/// Truncates an instant to the start of its hour.
pub fn hour_floor(value: NaiveDateTime) -> NaiveDateTime {
    let date = value.date();
    let hour = chrono::Timelike::hour(&value);
    date.and_hms_opt(hour, 0, 0).unwrap_or(value)
}

/// Adds whole days to an instant, saturating at the representable range.
pub fn add_days(value: NaiveDateTime, days: i64) -> NaiveDateTime {
    TimeDelta::try_days(days)
        .and_then(|delta| value.checked_add_signed(delta))
        .unwrap_or(value)
}

/// Reads one cell as an instant.
pub fn instant_at(df: &DataFrame, column: &str, idx: usize) -> Option<NaiveDateTime> {
    let value = df.column(column).ok()?.get(idx).ok()?;
    match value {
        AnyValue::Null => None,
        other => parse_instant(&any_to_string(other)),
    }
}

/// Reads a whole column as instants. An absent column reads as all-missing.
pub fn column_instants(df: &DataFrame, column: &str) -> Vec<Option<NaiveDateTime>> {
    (0..df.height())
        .map(|idx| instant_at(df, column, idx))
        .collect()
}
