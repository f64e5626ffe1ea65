//! Coverage status derived from a policy's end date.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};

use crate::error::ParseStatusError;

/// Default look-ahead for the `expiring` bucket.
pub const DEFAULT_EXPIRING_WINDOW_DAYS: i64 = 30;

/// Where a policy's end date sits relative to "now".
///
/// The three buckets partition every parsable end date: a policy is
/// `Expired` at or before now, `Expiring` within the window after now
/// (inclusive), and `Active` beyond the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyStatus {
    Active,
    Expiring,
    Expired,
}

impl PolicyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyStatus::Active => "active",
            PolicyStatus::Expiring => "expiring",
            PolicyStatus::Expired => "expired",
        }
    }

    /// Bucket an end date.
    pub fn classify(end: DateTime<Utc>, now: DateTime<Utc>, window: TimeDelta) -> Self {
        if end <= now {
            PolicyStatus::Expired
        } else if end <= now + window {
            PolicyStatus::Expiring
        } else {
            PolicyStatus::Active
        }
    }

    /// Whether a raw end date falls in this bucket. Absent or
    /// unparsable dates never match.
    pub fn matches_raw(self, end_date: Option<&str>, now: DateTime<Utc>, window: TimeDelta) -> bool {
        end_date
            .and_then(parse_end_date)
            .is_some_and(|end| Self::classify(end, now, window) == self)
    }
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(PolicyStatus::Active),
            "expiring" => Ok(PolicyStatus::Expiring),
            "expired" => Ok(PolicyStatus::Expired),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Parse a backend end date.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC)
/// and a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_end_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
