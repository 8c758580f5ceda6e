//! Persisted per-user reconciliation state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BotRecord, Meeting};

/// The unit of persistence: one document per user, read once at pass start
/// and written once at pass end.
///
/// Invariant: every key in `bots` either appears in `meetings` or its record
/// is flagged `meeting_removed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSyncState {
    /// Provider integration handle; created once, then stable.
    #[serde(default)]
    pub recall_calendar_id: Option<String>,
    /// Last-seen meeting snapshot, the anchor for the next pass's diff.
    #[serde(default)]
    pub meetings: Vec<Meeting>,
    /// Tracked bots keyed by meeting id.
    #[serde(default)]
    pub bots: BTreeMap<String, BotRecord>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_empty() {
        let state = UserSyncState::default();
        assert!(state.recall_calendar_id.is_none());
        assert!(state.meetings.is_empty());
        assert!(state.bots.is_empty());
        assert!(state.last_updated.is_none());
    }

    #[test]
    fn roundtrips_through_json() {
        let mut state = UserSyncState::default();
        state.recall_calendar_id = Some("cal-1".into());
        state.meetings.push(Meeting {
            id: "m1".into(),
            title: "Weekly".into(),
            start_time: "2026-01-05T09:00:00Z".into(),
            end_time: "2026-01-05T09:30:00Z".into(),
            meeting_url: "https://meet.example/xyz".into(),
        });

        let encoded = serde_json::to_string(&state).expect("serialize");
        let decoded: UserSyncState = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(decoded.recall_calendar_id.as_deref(), Some("cal-1"));
        assert_eq!(decoded.meetings.len(), 1);
    }
}
