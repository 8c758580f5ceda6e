//! Port interfaces for the reconciliation engine.
//!
//! Every external system the engine touches is reached through one of these
//! traits; `recap-infra` supplies the production adapters.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recap_domain::{
    BotDetails, BotProbe, Credential, Meeting, OauthGrant, Result, UserSyncState,
};

/// Identity provider: hands out refreshed access credentials per user.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Return a valid (refreshed if necessary) credential for the user.
    async fn refresh(&self, user_id: &str) -> Result<Credential>;

    /// Enumerate all user identifiers known to the credential source.
    async fn list_users(&self) -> Result<Vec<String>>;
}

/// Calendar + recording provider operations.
#[async_trait]
pub trait RecordingProvider: Send + Sync {
    /// Create a calendar integration for a user; returns the integration id.
    async fn create_calendar_integration(&self, grant: &OauthGrant) -> Result<String>;

    /// List upcoming events for an integration, normalized into [`Meeting`]s.
    ///
    /// Adapters handle pagination and drop deleted or id-less events.
    async fn list_events(
        &self,
        calendar_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Meeting>>;

    /// Schedule a recording bot for a calendar event; returns the bot id.
    async fn schedule_bot(&self, event_id: &str, meeting_url: &str) -> Result<String>;

    /// Unschedule a previously scheduled bot. An already-gone bot is success.
    async fn unschedule_bot(&self, bot_id: &str) -> Result<()>;

    /// Which of the given bots have a finished recording, keyed by bot id.
    async fn list_finished(&self, bot_ids: &[String]) -> Result<HashMap<String, BotDetails>>;

    /// Probe a single bot's provider-side status (orphan confirmation).
    async fn bot_status(&self, bot_id: &str) -> Result<BotProbe>;

    /// Download the finished recording to `dest`.
    async fn download_recording(&self, details: &BotDetails, dest: &Path) -> Result<()>;
}

/// Durable object storage for finished artifacts.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Upload a local file; returns the stored object's URL.
    async fn upload(&self, local_path: &Path, key: &str, content_type: &str) -> Result<String>;

    /// The URL an already-stored key resolves to.
    fn url_for(&self, key: &str) -> String;
}

/// Per-user persisted reconciliation state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load a user's state; absent or corrupt documents load as the default
    /// empty structure.
    async fn load(&self, user_id: &str) -> Result<UserSyncState>;

    async fn save(&self, user_id: &str, state: &UserSyncState) -> Result<()>;
}

/// Audio extraction from a downloaded recording.
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    /// Transcode `video_path` to an mp3 next to it; an existing output file
    /// is treated as success without re-transcoding.
    async fn to_mp3(&self, video_path: &Path) -> Result<PathBuf>;
}
