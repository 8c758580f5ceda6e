//! HTTP client for the recording/calendar provider API.
//!
//! Implements the [`RecordingProvider`] port: calendar integrations, event
//! listing with cursor pagination, bot scheduling and recording downloads.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recap_core::RecordingProvider;
use recap_domain::constants::{BOT_AUTO_LEAVE_TIMEOUT_SECS, EVENT_PAGE_LIMIT};
use recap_domain::{
    BotDetails, BotProbe, Meeting, OauthGrant, ProviderConfig, RecapError, Result,
};
use reqwest::{Client, Response, StatusCode};
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::errors::InfraError;
use crate::provider::types::{BotPayload, CalendarEvent, CreatedBot, CreatedCalendar, EventPage};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Recording downloads move a lot more bytes than API calls.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// HTTP adapter for a Recall-style recording provider.
pub struct RecallClient {
    http: Client,
    base_url: String,
    api_key: String,
    bot_name: String,
}

impl RecallClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| RecapError::Internal(format!("building HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            bot_name: config.bot_name.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.api_key)
    }

    /// Fetch one bot's raw payload; `None` when the provider no longer knows
    /// the bot.
    async fn fetch_bot(&self, bot_id: &str) -> Result<Option<(serde_json::Value, BotPayload)>> {
        let response = self
            .http
            .get(self.url(&format!("/bots/{bot_id}/")))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(http_err)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(error_for("fetching bot", response).await);
        }

        let raw: serde_json::Value = response.json().await.map_err(http_err)?;
        let payload: BotPayload =
            serde_json::from_value(raw.clone()).map_err(|e| RecapError::from(InfraError::from(e)))?;
        Ok(Some((raw, payload)))
    }
}

#[async_trait]
impl RecordingProvider for RecallClient {
    #[instrument(skip(self, grant))]
    async fn create_calendar_integration(&self, grant: &OauthGrant) -> Result<String> {
        let body = json!({
            "oauth_client_id": grant.client_id,
            "oauth_client_secret": grant.client_secret,
            "oauth_refresh_token": grant.refresh_token,
            "platform": grant.platform,
        });

        let response = self
            .http
            .post(self.url("/calendars/"))
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(http_err)?;

        if !response.status().is_success() {
            return Err(error_for("creating calendar integration", response).await);
        }

        let created: CreatedCalendar = response.json().await.map_err(http_err)?;
        Ok(created.id)
    }

    #[instrument(skip(self))]
    async fn list_events(
        &self,
        calendar_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Meeting>> {
        let mut meetings = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(self.url("/calendar-events/"))
                .header("Authorization", self.auth_header())
                // Both bounds filter on start time so a meeting that begins
                // inside the window but runs past its end is still included.
                .query(&[
                    ("calendar_id", calendar_id.to_string()),
                    ("start_time__gte", window_start.to_rfc3339()),
                    ("start_time__lte", window_end.to_rfc3339()),
                    ("limit", EVENT_PAGE_LIMIT.to_string()),
                ]);
            if let Some(cursor) = &cursor {
                request = request.query(&[("cursor", cursor.as_str())]);
            }

            let response = request.send().await.map_err(http_err)?;
            if !response.status().is_success() {
                return Err(error_for("listing calendar events", response).await);
            }

            let page: EventPage = response.json().await.map_err(http_err)?;
            meetings.extend(page.results.into_iter().filter_map(CalendarEvent::into_meeting));

            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(calendar_id, count = meetings.len(), "listed calendar events");
        Ok(meetings)
    }

    #[instrument(skip(self, meeting_url))]
    async fn schedule_bot(&self, event_id: &str, meeting_url: &str) -> Result<String> {
        // A fresh uuid in the deduplication key lets a rescheduled meeting
        // get a brand-new bot instead of resurrecting the deleted one.
        let body = json!({
            "meeting_url": meeting_url,
            "bot_name": self.bot_name,
            "deduplication_key": format!("event_{}_{}", event_id, Uuid::new_v4()),
            "automatic_leave": {
                "waiting_room_timeout": BOT_AUTO_LEAVE_TIMEOUT_SECS,
                "noone_joined_timeout": BOT_AUTO_LEAVE_TIMEOUT_SECS,
            },
        });

        let response = self
            .http
            .post(self.url("/bots/"))
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(http_err)?;

        if !response.status().is_success() {
            return Err(error_for("scheduling bot", response).await);
        }

        let created: CreatedBot = response.json().await.map_err(http_err)?;
        Ok(created.id)
    }

    #[instrument(skip(self))]
    async fn unschedule_bot(&self, bot_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/bots/{bot_id}/")))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(http_err)?;

        // A bot the provider already forgot is an unschedule success.
        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(error_for("unscheduling bot", response).await)
    }

    #[instrument(skip(self, bot_ids), fields(count = bot_ids.len()))]
    async fn list_finished(&self, bot_ids: &[String]) -> Result<HashMap<String, BotDetails>> {
        let mut finished = HashMap::new();

        for bot_id in bot_ids {
            match self.fetch_bot(bot_id).await {
                Ok(Some((raw, payload))) if payload.is_finished() => {
                    finished.insert(bot_id.clone(), payload.into_details(raw));
                }
                Ok(_) => {}
                Err(error) => {
                    warn!(bot_id, %error, "could not check bot, skipping this pass");
                }
            }
        }

        Ok(finished)
    }

    #[instrument(skip(self))]
    async fn bot_status(&self, bot_id: &str) -> Result<BotProbe> {
        let Some((raw, payload)) = self.fetch_bot(bot_id).await? else {
            return Ok(BotProbe::Gone);
        };

        let failed = payload
            .latest_status()
            .map(|code| code == "fatal" || code.contains("error"))
            .unwrap_or(false);
        // A failed bot that still produced a recording is downloadable, so it
        // must not be swept as an orphan.
        if failed && payload.video_url.is_none() {
            return Ok(BotProbe::Errored);
        }
        Ok(BotProbe::Alive(payload.into_details(raw)))
    }

    #[instrument(skip(self, details), fields(bot_id = %details.bot_id))]
    async fn download_recording(&self, details: &BotDetails, dest: &Path) -> Result<()> {
        let url = details.download_url.as_deref().ok_or_else(|| {
            RecapError::Provider(format!("bot {} has no download url", details.bot_id))
        })?;

        // Recording URLs are presigned, no auth header needed.
        let mut response = self
            .http
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(http_err)?;
        if !response.status().is_success() {
            return Err(error_for("downloading recording", response).await);
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| RecapError::Storage(format!("creating {}: {e}", dest.display())))?;
        while let Some(chunk) = response.chunk().await.map_err(http_err)? {
            file.write_all(&chunk)
                .await
                .map_err(|e| RecapError::Storage(format!("writing {}: {e}", dest.display())))?;
        }
        file.flush()
            .await
            .map_err(|e| RecapError::Storage(format!("flushing {}: {e}", dest.display())))?;

        Ok(())
    }
}

fn http_err(error: reqwest::Error) -> RecapError {
    InfraError::from(error).into()
}

async fn error_for(context: &str, response: Response) -> RecapError {
    let status = response.status();
    let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
    let message = format!("{context} failed ({status}): {body}");

    match status.as_u16() {
        401 | 403 => RecapError::Auth(message),
        404 => RecapError::NotFound(message),
        _ => RecapError::Provider(message),
    }
}
