//! Wire types for the recording provider API.

use recap_domain::{extract_meeting_url, BotDetails, Meeting};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedCalendar {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedBot {
    pub id: String,
}

/// One page of calendar events, with an opaque pagination cursor.
#[derive(Debug, Deserialize)]
pub(crate) struct EventPage {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub results: Vec<CalendarEvent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub meeting_url: Option<String>,
    /// Untouched platform event payload as forwarded by the provider.
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl CalendarEvent {
    /// Normalize into a domain meeting. Deleted and id-less events are
    /// dropped.
    pub(crate) fn into_meeting(self) -> Option<Meeting> {
        if self.id.is_empty() || self.is_deleted {
            return None;
        }

        let meeting_url = extract_meeting_url(self.meeting_url.as_deref(), Some(&self.raw));
        let title = self
            .title
            .filter(|t| !t.is_empty())
            .or_else(|| {
                self.raw
                    .get("summary")
                    .and_then(|v| v.as_str())
                    .or_else(|| self.raw.get("subject").and_then(|v| v.as_str()))
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "No Title".to_string());

        Some(Meeting {
            id: self.id,
            title,
            start_time: self.start_time,
            end_time: self.end_time,
            meeting_url,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BotPayload {
    pub id: String,
    #[serde(default)]
    pub status_changes: Vec<StatusChange>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub meeting_metadata: Option<MeetingMetadata>,
    #[serde(default)]
    pub meeting_participants: Vec<Participant>,
    #[serde(default)]
    pub join_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChange {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MeetingMetadata {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Participant {
    #[serde(default)]
    pub name: String,
}

impl BotPayload {
    pub(crate) fn latest_status(&self) -> Option<&str> {
        self.status_changes.last().map(|s| s.code.as_str())
    }

    /// A bot is finished once it has passed through the `done` status and a
    /// recording is available for download.
    pub(crate) fn is_finished(&self) -> bool {
        self.status_changes.iter().any(|s| s.code == "done") && self.video_url.is_some()
    }

    pub(crate) fn into_details(self, raw: serde_json::Value) -> BotDetails {
        let end_time = self
            .status_changes
            .iter()
            .find(|s| s.code == "done")
            .and_then(|s| s.created_at.clone());

        BotDetails {
            bot_id: self.id,
            title: self.meeting_metadata.and_then(|m| m.title),
            participants: self
                .meeting_participants
                .into_iter()
                .map(|p| p.name)
                .filter(|name| !name.is_empty())
                .collect(),
            start_time: self.join_at,
            end_time,
            download_url: self.video_url,
            raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deleted_event_is_dropped() {
        let event = CalendarEvent {
            id: "e1".to_string(),
            is_deleted: true,
            title: None,
            start_time: String::new(),
            end_time: String::new(),
            meeting_url: None,
            raw: json!({}),
        };
        assert!(event.into_meeting().is_none());
    }

    #[test]
    fn event_title_prefers_own_field_then_summary() {
        let event = CalendarEvent {
            id: "e1".to_string(),
            is_deleted: false,
            title: Some("Weekly Sync".to_string()),
            start_time: "2026-06-01T09:00:00Z".to_string(),
            end_time: "2026-06-01T10:00:00Z".to_string(),
            meeting_url: Some("https://zoom.us/j/1".to_string()),
            raw: json!({"summary": "ignored", "subject": "ignored"}),
        };
        let meeting = event.into_meeting().unwrap();
        assert_eq!(meeting.title, "Weekly Sync");
        assert_eq!(meeting.meeting_url, "https://zoom.us/j/1");
    }

    #[test]
    fn event_title_falls_back_to_payload_then_placeholder() {
        let event = CalendarEvent {
            id: "e1".to_string(),
            is_deleted: false,
            title: None,
            start_time: "2026-06-01T09:00:00Z".to_string(),
            end_time: "2026-06-01T10:00:00Z".to_string(),
            meeting_url: Some("https://zoom.us/j/1".to_string()),
            raw: json!({"summary": "Standup", "subject": "ignored"}),
        };
        assert_eq!(event.into_meeting().unwrap().title, "Standup");

        let event = CalendarEvent {
            id: "e2".to_string(),
            is_deleted: false,
            title: None,
            start_time: "2026-06-01T09:00:00Z".to_string(),
            end_time: "2026-06-01T10:00:00Z".to_string(),
            meeting_url: None,
            raw: json!({}),
        };
        assert_eq!(event.into_meeting().unwrap().title, "No Title");
    }

    #[test]
    fn finished_requires_done_status_and_recording() {
        let payload: BotPayload = serde_json::from_value(json!({
            "id": "b1",
            "status_changes": [{"code": "joining"}, {"code": "done", "created_at": "2026-06-01T10:00:00Z"}]
        }))
        .unwrap();
        assert!(!payload.is_finished(), "no recording url yet");

        let payload: BotPayload = serde_json::from_value(json!({
            "id": "b1",
            "status_changes": [{"code": "done", "created_at": "2026-06-01T10:00:00Z"}],
            "video_url": "https://recordings.test/b1.mp4"
        }))
        .unwrap();
        assert!(payload.is_finished());
    }

    #[test]
    fn details_carry_roster_and_done_timestamp() {
        let raw = json!({
            "id": "b1",
            "join_at": "2026-06-01T09:00:00Z",
            "status_changes": [{"code": "done", "created_at": "2026-06-01T10:00:00Z"}],
            "video_url": "https://recordings.test/b1.mp4",
            "meeting_metadata": {"title": "Standup"},
            "meeting_participants": [{"name": "Alice"}, {"name": ""}]
        });
        let payload: BotPayload = serde_json::from_value(raw.clone()).unwrap();
        let details = payload.into_details(raw);

        assert_eq!(details.title.as_deref(), Some("Standup"));
        assert_eq!(details.participants, vec!["Alice".to_string()]);
        assert_eq!(details.end_time.as_deref(), Some("2026-06-01T10:00:00Z"));
        assert_eq!(details.start_time.as_deref(), Some("2026-06-01T09:00:00Z"));
    }
}
