//! Meeting URL extraction from heterogeneous calendar payloads.
//!
//! Calendar events carry their conferencing link in one of several places:
//! a direct `meeting_url` field, structured conference data entry points, or
//! a free-text location. Extraction runs an explicit ordered rule list and
//! returns the first confident match:
//!
//! 1. direct `meeting_url` field
//! 2. structured entry point of type `video`
//! 3. any http(s) entry-point URI
//! 4. any remaining entry-point URI (telephony fallback)
//! 5. free-text location token on a known meeting domain

use serde_json::Value;

use crate::constants::KNOWN_MEETING_DOMAINS;

/// Extract the best conferencing URL for an event.
///
/// `direct` is the provider's own `meeting_url` field; `raw` is the
/// underlying calendar payload (Google-style `conferenceData` / `location`).
/// Returns an empty string when no rule matches.
pub fn extract_meeting_url(direct: Option<&str>, raw: Option<&Value>) -> String {
    let rules: [fn(Option<&str>, Option<&Value>) -> Option<String>; 5] = [
        direct_field,
        structured_video_entry,
        structured_web_uri,
        structured_any_uri,
        location_domain_match,
    ];

    for rule in rules {
        if let Some(url) = rule(direct, raw) {
            return url;
        }
    }

    String::new()
}

fn direct_field(direct: Option<&str>, _raw: Option<&Value>) -> Option<String> {
    direct.filter(|url| !url.is_empty()).map(str::to_string)
}

fn entry_points(raw: Option<&Value>) -> Option<&Vec<Value>> {
    raw?.get("conferenceData")?.get("entryPoints")?.as_array()
}

fn structured_video_entry(_direct: Option<&str>, raw: Option<&Value>) -> Option<String> {
    entry_points(raw)?
        .iter()
        .find(|entry| entry.get("entryPointType").and_then(Value::as_str) == Some("video"))
        .and_then(|entry| entry.get("uri").and_then(Value::as_str))
        .filter(|uri| !uri.is_empty())
        .map(str::to_string)
}

fn structured_web_uri(_direct: Option<&str>, raw: Option<&Value>) -> Option<String> {
    entry_points(raw)?
        .iter()
        .filter_map(|entry| entry.get("uri").and_then(Value::as_str))
        .find(|uri| uri.starts_with("http://") || uri.starts_with("https://"))
        .map(str::to_string)
}

fn structured_any_uri(_direct: Option<&str>, raw: Option<&Value>) -> Option<String> {
    entry_points(raw)?
        .iter()
        .filter_map(|entry| entry.get("uri").and_then(Value::as_str))
        .filter(|uri| !uri.is_empty())
        .next_back()
        .map(str::to_string)
}

fn location_domain_match(_direct: Option<&str>, raw: Option<&Value>) -> Option<String> {
    let location = raw?.get("location")?.as_str()?;

    for word in location.split_whitespace() {
        let normalized = word.to_lowercase();
        let on_known_domain =
            KNOWN_MEETING_DOMAINS.iter().any(|domain| normalized.contains(domain));
        if on_known_domain
            && (normalized.starts_with("http://") || normalized.starts_with("https://"))
        {
            // Keep original casing; meeting codes can be case-sensitive.
            return Some(word.to_string());
        }
    }

    None
}
