//! Timestamp helpers.
//!
//! Every timestamp is stored as RFC 3339 UTC with millisecond precision, so
//! stored values compare correctly as plain strings.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};

pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    parse_day(value).map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

/// Like [`parse_timestamp`], but a bare date means the end of that day.
pub fn parse_end_of_day(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    match parse_day(value) {
        Some(day) => day
            .and_hms_milli_opt(23, 59, 59, 999)
            .map(|naive| naive.and_utc()),
        None => parse_timestamp(value),
    }
}
