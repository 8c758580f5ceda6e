//! Hand-rolled port fakes shared by the unit tests in this crate.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use recap_domain::{
    BotDetails, BotProbe, Credential, Meeting, OauthGrant, RecapError, Result, UserSyncState,
};

use crate::ports::{
    AudioTranscoder, BlobStore, CredentialProvider, RecordingProvider, StateStore,
};

#[derive(Default)]
pub struct MockCredentialProvider {
    users: Vec<String>,
    stripped: Mutex<HashSet<String>>,
    failing: Mutex<HashSet<String>>,
}

impl MockCredentialProvider {
    pub fn with_users(users: &[&str]) -> Self {
        Self {
            users: users.iter().map(|u| u.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn strip_refresh_token(&self, user_id: &str) {
        self.stripped.lock().unwrap().insert(user_id.to_string());
    }

    pub fn fail_refresh(&self, user_id: &str) {
        self.failing.lock().unwrap().insert(user_id.to_string());
    }
}

#[async_trait]
impl CredentialProvider for MockCredentialProvider {
    async fn refresh(&self, user_id: &str) -> Result<Credential> {
        if self.failing.lock().unwrap().contains(user_id) {
            return Err(RecapError::Auth(format!("refresh denied for {user_id}")));
        }
        let refresh_token = if self.stripped.lock().unwrap().contains(user_id) {
            None
        } else {
            Some(format!("refresh-{user_id}"))
        };
        Ok(Credential {
            access_token: format!("token-{user_id}"),
            refresh_token,
            expires_at: Some(Utc::now() + Duration::hours(1)),
        })
    }

    async fn list_users(&self) -> Result<Vec<String>> {
        Ok(self.users.clone())
    }
}

#[derive(Default)]
pub struct MockProvider {
    events: Mutex<Vec<Meeting>>,
    scheduled: Mutex<Vec<String>>,
    unscheduled: Mutex<Vec<String>>,
    schedule_failures: Mutex<HashSet<String>>,
    integrations: Mutex<usize>,
    finished: Mutex<HashMap<String, BotDetails>>,
    finish_everything: Mutex<bool>,
    list_finished_fails: Mutex<bool>,
    statuses: Mutex<HashMap<String, BotProbe>>,
    status_probes: Mutex<usize>,
    downloads: Mutex<usize>,
    download_failures: Mutex<HashSet<String>>,
}

impl MockProvider {
    pub fn set_events(&self, events: Vec<Meeting>) {
        *self.events.lock().unwrap() = events;
    }

    pub fn scheduled(&self) -> Vec<String> {
        self.scheduled.lock().unwrap().clone()
    }

    pub fn unscheduled(&self) -> Vec<String> {
        self.unscheduled.lock().unwrap().clone()
    }

    pub fn fail_schedule(&self, event_id: &str) {
        self.schedule_failures.lock().unwrap().insert(event_id.to_string());
    }

    pub fn integrations_created(&self) -> usize {
        *self.integrations.lock().unwrap()
    }

    pub fn add_finished(&self, bot_id: &str, details: BotDetails) {
        self.finished.lock().unwrap().insert(bot_id.to_string(), details);
    }

    /// Report every queried bot as finished with synthesized details.
    pub fn finish_scheduled_bots(&self) {
        *self.finish_everything.lock().unwrap() = true;
    }

    pub fn fail_list_finished(&self) {
        *self.list_finished_fails.lock().unwrap() = true;
    }

    pub fn set_status(&self, bot_id: &str, probe: BotProbe) {
        self.statuses.lock().unwrap().insert(bot_id.to_string(), probe);
    }

    pub fn status_probes(&self) -> usize {
        *self.status_probes.lock().unwrap()
    }

    pub fn downloads(&self) -> usize {
        *self.downloads.lock().unwrap()
    }

    pub fn fail_download(&self, bot_id: &str) {
        self.download_failures.lock().unwrap().insert(bot_id.to_string());
    }
}

fn synthetic_details(bot_id: &str) -> BotDetails {
    BotDetails {
        bot_id: bot_id.to_string(),
        title: Some(format!("Recording {bot_id}")),
        participants: vec!["Alice".to_string()],
        start_time: Some("2026-06-01T09:00:00Z".to_string()),
        end_time: Some("2026-06-01T10:00:00Z".to_string()),
        download_url: Some(format!("https://recordings.test/{bot_id}.mp4")),
        raw: serde_json::json!({"id": bot_id}),
    }
}

#[async_trait]
impl RecordingProvider for MockProvider {
    async fn create_calendar_integration(&self, grant: &OauthGrant) -> Result<String> {
        *self.integrations.lock().unwrap() += 1;
        let suffix = grant
            .refresh_token
            .strip_prefix("refresh-")
            .unwrap_or(&grant.refresh_token);
        Ok(format!("cal-{suffix}"))
    }

    async fn list_events(
        &self,
        _calendar_id: &str,
        _window_start: DateTime<Utc>,
        _window_end: DateTime<Utc>,
    ) -> Result<Vec<Meeting>> {
        Ok(self.events.lock().unwrap().clone())
    }

    async fn schedule_bot(&self, event_id: &str, _meeting_url: &str) -> Result<String> {
        if self.schedule_failures.lock().unwrap().contains(event_id) {
            return Err(RecapError::Provider(format!("cannot schedule {event_id}")));
        }
        self.scheduled.lock().unwrap().push(event_id.to_string());
        Ok(format!("bot-{event_id}"))
    }

    async fn unschedule_bot(&self, bot_id: &str) -> Result<()> {
        self.unscheduled.lock().unwrap().push(bot_id.to_string());
        Ok(())
    }

    async fn list_finished(&self, bot_ids: &[String]) -> Result<HashMap<String, BotDetails>> {
        if *self.list_finished_fails.lock().unwrap() {
            return Err(RecapError::Network("finished query unavailable".to_string()));
        }
        let preset = self.finished.lock().unwrap();
        let finish_everything = *self.finish_everything.lock().unwrap();
        let mut out = HashMap::new();
        for bot_id in bot_ids {
            if let Some(details) = preset.get(bot_id) {
                out.insert(bot_id.clone(), details.clone());
            } else if finish_everything {
                out.insert(bot_id.clone(), synthetic_details(bot_id));
            }
        }
        Ok(out)
    }

    async fn bot_status(&self, bot_id: &str) -> Result<BotProbe> {
        *self.status_probes.lock().unwrap() += 1;
        self.statuses
            .lock()
            .unwrap()
            .get(bot_id)
            .cloned()
            .ok_or_else(|| RecapError::NotFound(format!("no status for {bot_id}")))
    }

    async fn download_recording(&self, details: &BotDetails, dest: &Path) -> Result<()> {
        *self.downloads.lock().unwrap() += 1;
        if self.download_failures.lock().unwrap().contains(&details.bot_id) {
            return Err(RecapError::Network(format!("download failed for {}", details.bot_id)));
        }
        tokio::fs::write(dest, b"fake video bytes")
            .await
            .map_err(|e| RecapError::Storage(e.to_string()))
    }
}

#[derive(Default)]
pub struct MockBlobStore {
    existing: Mutex<HashSet<String>>,
    uploads: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
}

impl MockBlobStore {
    pub fn preload(&self, key: &str) {
        self.existing.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_key(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.existing.lock().unwrap().contains(key)
            || self.uploads.lock().unwrap().iter().any(|k| k == key))
    }

    async fn upload(&self, _local_path: &Path, key: &str, _content_type: &str) -> Result<String> {
        if self.failing.lock().unwrap().contains(key) {
            return Err(RecapError::Storage(format!("upload rejected for {key}")));
        }
        self.uploads.lock().unwrap().push(key.to_string());
        Ok(self.url_for(key))
    }

    fn url_for(&self, key: &str) -> String {
        format!("blob://test/{key}")
    }
}

#[derive(Default)]
pub struct MockTranscoder;

#[async_trait]
impl AudioTranscoder for MockTranscoder {
    async fn to_mp3(&self, video_path: &Path) -> Result<PathBuf> {
        let out = video_path.with_extension("mp3");
        tokio::fs::write(&out, b"fake mp3 bytes")
            .await
            .map_err(|e| RecapError::Media(e.to_string()))?;
        Ok(out)
    }
}

#[derive(Default)]
pub struct MockStateStore {
    current: Mutex<HashMap<String, UserSyncState>>,
    save_log: Mutex<HashMap<String, Vec<UserSyncState>>>,
}

impl MockStateStore {
    pub fn saves(&self, user_id: &str) -> Vec<UserSyncState> {
        self.save_log.lock().unwrap().get(user_id).cloned().unwrap_or_default()
    }

    pub fn load_sync(&self, user_id: &str) -> UserSyncState {
        self.current.lock().unwrap().get(user_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl StateStore for MockStateStore {
    async fn load(&self, user_id: &str) -> Result<UserSyncState> {
        Ok(self.load_sync(user_id))
    }

    async fn save(&self, user_id: &str, state: &UserSyncState) -> Result<()> {
        self.current
            .lock()
            .unwrap()
            .insert(user_id.to_string(), state.clone());
        self.save_log
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .push(state.clone());
        Ok(())
    }
}
