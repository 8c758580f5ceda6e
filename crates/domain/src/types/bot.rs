//! Bot tracking records and provider-reported bot details.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Engine-owned tracking entry mapping one meeting to one recording bot.
///
/// Keyed by `meeting_id` in [`crate::UserSyncState::bots`]. A record with
/// `audio_processed = true` is terminal: it is never scheduled or
/// unscheduled again and is only mutated by the capture pipeline marking it
/// complete, or deleted outright during orphan cleanup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotRecord {
    pub bot_id: String,
    pub meeting_url: String,
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub scheduled_at: DateTime<Utc>,
    pub audio_processed: bool,
    pub meeting_removed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

impl BotRecord {
    /// Fresh record for a newly scheduled bot.
    pub fn scheduled(bot_id: String, meeting: &crate::Meeting, now: DateTime<Utc>) -> Self {
        Self {
            bot_id,
            meeting_url: meeting.meeting_url.clone(),
            title: meeting.title.clone(),
            start_time: meeting.start_time.clone(),
            end_time: meeting.end_time.clone(),
            scheduled_at: now,
            audio_processed: false,
            meeting_removed: false,
            removed_at: None,
            audio_url: None,
            metadata_url: None,
            participants: None,
            processed_at: None,
        }
    }
}

/// Details the provider reports for a finished (or still-live) bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotDetails {
    pub bot_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    /// Present once the recording can be downloaded.
    #[serde(default)]
    pub download_url: Option<String>,
    /// Full raw provider payload, carried into the metadata document.
    #[serde(default)]
    pub raw: serde_json::Value,
}

/// Outcome of probing a single bot's status during orphan confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum BotProbe {
    /// Provider no longer knows the bot (404).
    Gone,
    /// Provider reports an error state with no recording to fetch.
    Errored,
    /// Bot still exists provider-side.
    Alive(BotDetails),
}
