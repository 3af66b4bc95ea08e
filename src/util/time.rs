//! Timestamp parsing and elapsed-time helpers.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse an ISO-8601 timestamp into UTC.
///
/// A trailing `Z` is rewritten to `+00:00` before parsing. Timestamps without
/// an offset are taken as UTC and bare dates as midnight UTC. Returns `None`
/// for empty or unparseable input.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = match trimmed.strip_suffix('Z').or_else(|| trimmed.strip_suffix('z')) {
        Some(stripped) => format!("{stripped}+00:00"),
        None => trimmed.to_string(),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%:z") {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Elapsed time from `start` to `end` in fractional days.
///
/// Negative when `end` precedes `start`; callers decide whether to drop it.
#[must_use]
pub fn elapsed_days(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    end.signed_duration_since(start).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Calendar month key (`YYYY-MM`) for a date or timestamp.
#[must_use]
pub fn month_key<D: Datelike>(date: &D) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}
