//! Timestamp handling for provider-supplied event times.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse an ISO-8601 timestamp from the provider.
///
/// Accepts RFC 3339 values (`Z` suffix or explicit offset) and naive
/// timestamps, which are treated as UTC. Returns `None` for anything else.
pub fn parse_provider_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    // Naive timestamps are assumed to be UTC.
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// True when `end_time` parses and lies strictly before `now`.
///
/// An unparseable or missing end time is treated as *not* in the past, so
/// ambiguous data never causes a bot to be discarded.
pub fn is_in_past(end_time: &str, now: DateTime<Utc>) -> bool {
    match parse_provider_timestamp(end_time) {
        Some(end) => end < now,
        None => false,
    }
}
