//! Provider-sourced meeting snapshot.

use serde::{Deserialize, Serialize};

/// One upcoming meeting as reported by the calendar provider.
///
/// This is an ephemeral snapshot, not owned by the engine; `id` is the
/// provider-assigned event id and is stable across polls. Timestamps are
/// kept exactly as the provider sent them: the diff engine compares them as
/// opaque strings, and the past/future tie-break has to see the raw value
/// to treat an unparseable `end_time` conservatively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    /// Best-effort extracted conferencing URL; empty when none was found.
    #[serde(default)]
    pub meeting_url: String,
}

impl Meeting {
    /// True when the tracked fields that warrant rescheduling differ.
    ///
    /// Title changes alone do not trigger rescheduling.
    pub fn tracked_fields_differ(&self, other: &Self) -> bool {
        self.start_time != other.start_time
            || self.end_time != other.end_time
            || self.meeting_url != other.meeting_url
    }
}
