//! Capture pipeline: turns finished provider recordings into uploaded audio
//! and metadata artifacts, and sweeps orphaned bot records.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use recap_domain::constants::EXCLUDED_PARTICIPANT_MARKERS;
use recap_domain::{BotDetails, BotProbe, BotRecord, RecapError, Result, UserSyncState};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::ports::{AudioTranscoder, BlobStore, RecordingProvider};

/// What a single capture pass did for one user.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub processed: usize,
    pub orphans_removed: usize,
    /// Whether the user's state was mutated and needs saving.
    pub changed: bool,
}

pub struct CapturePipeline {
    provider: Arc<dyn RecordingProvider>,
    blob: Arc<dyn BlobStore>,
    transcoder: Arc<dyn AudioTranscoder>,
    work_dir: PathBuf,
    orphan_threshold: Duration,
}

impl CapturePipeline {
    pub fn new(
        provider: Arc<dyn RecordingProvider>,
        blob: Arc<dyn BlobStore>,
        transcoder: Arc<dyn AudioTranscoder>,
        work_dir: PathBuf,
        orphan_threshold: Duration,
    ) -> Self {
        Self {
            provider,
            blob,
            transcoder,
            work_dir,
            orphan_threshold,
        }
    }

    /// Process every unfinished bot record for one user.
    ///
    /// Each record is handled independently; a failure captures nothing for
    /// that meeting and it is retried on the next pass.
    pub async fn process_finished(
        &self,
        user_id: &str,
        state: &mut UserSyncState,
        now: DateTime<Utc>,
    ) -> CaptureOutcome {
        let mut outcome = CaptureOutcome::default();

        // bot id -> meeting id for every record still awaiting capture.
        let candidates: HashMap<String, String> = state
            .bots
            .iter()
            .filter(|(_, record)| !record.bot_id.is_empty() && !record.audio_processed)
            .map(|(meeting_id, record)| (record.bot_id.clone(), meeting_id.clone()))
            .collect();

        if candidates.is_empty() {
            return outcome;
        }

        // Records whose meeting vanished long enough ago to suspect the bot
        // never produced anything.
        let suspects: Vec<(String, String)> = state
            .bots
            .iter()
            .filter(|(_, record)| {
                !record.audio_processed
                    && record.meeting_removed
                    && record
                        .removed_at
                        .map(|removed| removed + self.orphan_threshold < now)
                        .unwrap_or(false)
            })
            .map(|(meeting_id, record)| (meeting_id.clone(), record.bot_id.clone()))
            .collect();

        let bot_ids: Vec<String> = candidates.keys().cloned().collect();
        let finished = match self.provider.list_finished(&bot_ids).await {
            Ok(finished) => finished,
            Err(error) => {
                warn!(user_id, %error, "could not query finished bots, deferring capture");
                HashMap::new()
            }
        };

        for (meeting_id, bot_id) in &suspects {
            if finished.contains_key(bot_id) {
                continue;
            }
            match self.provider.bot_status(bot_id).await {
                Ok(BotProbe::Gone) | Ok(BotProbe::Errored) => {
                    info!(user_id, meeting_id, bot_id, "removing orphaned bot record");
                    state.bots.remove(meeting_id);
                    outcome.orphans_removed += 1;
                    outcome.changed = true;
                }
                Ok(BotProbe::Alive(_)) => {
                    debug!(user_id, bot_id, "suspected orphan still alive at provider");
                }
                Err(error) => {
                    warn!(user_id, bot_id, %error, "orphan probe failed, keeping record");
                }
            }
        }

        for (bot_id, details) in &finished {
            let Some(meeting_id) = candidates.get(bot_id) else {
                continue;
            };
            let Some(record) = state.bots.get_mut(meeting_id) else {
                continue;
            };

            let audio_key = format!("{user_id}/{meeting_id}/recording.mp3");
            let meta_key = format!("{user_id}/{meeting_id}/metadata.json");

            if self.already_uploaded(&audio_key).await && self.already_uploaded(&meta_key).await {
                info!(user_id, meeting_id, bot_id, "artifacts already uploaded, marking processed");
                mark_processed(
                    record,
                    self.blob.url_for(&audio_key),
                    self.blob.url_for(&meta_key),
                    details,
                    now,
                );
                outcome.processed += 1;
                outcome.changed = true;
                continue;
            }

            match self
                .capture_one(user_id, meeting_id, record, details, &audio_key, &meta_key, now)
                .await
            {
                Ok((audio_url, metadata_url)) => {
                    mark_processed(record, audio_url, metadata_url, details, now);
                    outcome.processed += 1;
                    outcome.changed = true;
                }
                Err(error) => {
                    warn!(user_id, meeting_id, bot_id, %error, "capture failed, will retry next pass");
                }
            }
        }

        outcome
    }

    async fn already_uploaded(&self, key: &str) -> bool {
        match self.blob.exists(key).await {
            Ok(exists) => exists,
            Err(error) => {
                warn!(key, %error, "blob existence check failed, assuming absent");
                false
            }
        }
    }

    /// Download, transcode, describe and upload one finished recording.
    ///
    /// Local temp files are deleted on download/transcode/metadata failure but
    /// kept when an upload fails, so the next pass can resume from disk state.
    #[allow(clippy::too_many_arguments)]
    async fn capture_one(
        &self,
        user_id: &str,
        meeting_id: &str,
        record: &BotRecord,
        details: &BotDetails,
        audio_key: &str,
        meta_key: &str,
        now: DateTime<Utc>,
    ) -> Result<(String, String)> {
        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .map_err(|e| RecapError::Storage(format!("creating work dir: {e}")))?;

        let bot_id = &details.bot_id;
        let download_path = self.work_dir.join(format!("{bot_id}.mp4"));
        if let Err(error) = self.provider.download_recording(details, &download_path).await {
            remove_quietly(&download_path).await;
            return Err(error);
        }

        // A descriptive name keeps leftovers identifiable when an upload
        // fails and the file survives to the next pass.
        let renamed = self
            .work_dir
            .join(format!("{user_id}_{meeting_id}_{bot_id}.mp4"));
        let video_path = match tokio::fs::rename(&download_path, &renamed).await {
            Ok(()) => renamed,
            Err(error) => {
                warn!(bot_id, %error, "could not rename downloaded recording");
                download_path
            }
        };

        let audio_path = match self.transcoder.to_mp3(&video_path).await {
            Ok(path) => path,
            Err(error) => {
                remove_quietly(&video_path).await;
                return Err(error);
            }
        };

        let metadata = build_metadata(user_id, meeting_id, record, details, now);
        let meta_path = audio_path.with_extension("json");
        let encoded = serde_json::to_vec_pretty(&metadata)
            .map_err(|e| RecapError::Internal(format!("encoding metadata: {e}")))?;
        if let Err(error) = tokio::fs::write(&meta_path, encoded).await {
            remove_quietly(&video_path).await;
            remove_quietly(&audio_path).await;
            return Err(RecapError::Storage(format!("writing metadata: {error}")));
        }

        let audio_url = match self.blob.upload(&audio_path, audio_key, "audio/mpeg").await {
            Ok(url) => url,
            Err(error) => {
                warn!(bot_id, %error, "audio upload failed, keeping local files for retry");
                return Err(error);
            }
        };
        let metadata_url = match self.blob.upload(&meta_path, meta_key, "application/json").await {
            Ok(url) => url,
            Err(error) => {
                warn!(bot_id, %error, "metadata upload failed, keeping local files for retry");
                return Err(error);
            }
        };

        remove_quietly(&video_path).await;
        remove_quietly(&audio_path).await;
        remove_quietly(&meta_path).await;

        Ok((audio_url, metadata_url))
    }
}

fn mark_processed(
    record: &mut BotRecord,
    audio_url: String,
    metadata_url: String,
    details: &BotDetails,
    now: DateTime<Utc>,
) {
    record.audio_processed = true;
    record.audio_url = Some(audio_url);
    record.metadata_url = Some(metadata_url);
    let participants = filter_participants(&details.participants);
    if !participants.is_empty() {
        record.participants = Some(participants);
    }
    record.processed_at = Some(now);
}

fn build_metadata(
    user_id: &str,
    meeting_id: &str,
    record: &BotRecord,
    details: &BotDetails,
    now: DateTime<Utc>,
) -> serde_json::Value {
    json!({
        "meeting_id": meeting_id,
        "bot_id": details.bot_id,
        "user_id": user_id,
        "title": details.title.clone().unwrap_or_else(|| record.title.clone()),
        "participants": filter_participants(&details.participants),
        "start_time": details.start_time.clone().unwrap_or_else(|| record.start_time.clone()),
        "end_time": details.end_time.clone().unwrap_or_else(|| record.end_time.clone()),
        "provider_payload": details.raw,
        "processed_at": now.to_rfc3339(),
    })
}

/// Drop notetaker-bot attendees other services injected into the roster.
fn filter_participants(names: &[String]) -> Vec<String> {
    names
        .iter()
        .filter(|name| {
            let lowered = name.to_lowercase();
            !EXCLUDED_PARTICIPANT_MARKERS
                .iter()
                .any(|marker| lowered.contains(&marker.to_lowercase()))
        })
        .cloned()
        .collect()
}

async fn remove_quietly(path: &Path) {
    if let Err(error) = tokio::fs::remove_file(path).await {
        if error.kind() != std::io::ErrorKind::NotFound {
            debug!(path = %path.display(), %error, "could not remove temp file");
        }
    }
}
