use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use recap_domain::{is_in_past, BotRecord, Meeting};
use tracing::{debug, info, warn};

use crate::ports::RecordingProvider;
use crate::reconcile::diff::MeetingDiff;

/// Applies a [`MeetingDiff`] to the provider by scheduling and unscheduling
/// recording bots, and mirrors the result into the per-meeting bot records.
///
/// Provider failures here are deliberately soft: one meeting that cannot be
/// (un)scheduled never aborts the rest of the diff.
pub struct BotLifecycleManager {
    provider: Arc<dyn RecordingProvider>,
}

impl BotLifecycleManager {
    pub fn new(provider: Arc<dyn RecordingProvider>) -> Self {
        Self { provider }
    }

    /// Apply the diff. Returns whether `bots` was mutated.
    ///
    /// `old_meetings` is the snapshot the diff was computed against; removed
    /// meetings are looked up there to decide whether they already ended.
    pub async fn apply(
        &self,
        diff: &MeetingDiff,
        old_meetings: &[Meeting],
        bots: &mut BTreeMap<String, BotRecord>,
        now: DateTime<Utc>,
    ) -> bool {
        let mut changed = false;

        for meeting in &diff.new {
            changed |= self.schedule_new(meeting, bots, now).await;
        }

        for meeting in &diff.changed {
            changed |= self.reschedule_changed(meeting, bots, now).await;
        }

        for meeting_id in &diff.removed {
            changed |= self
                .handle_removed(meeting_id, old_meetings, bots, now)
                .await;
        }

        changed
    }

    async fn schedule_new(
        &self,
        meeting: &Meeting,
        bots: &mut BTreeMap<String, BotRecord>,
        now: DateTime<Utc>,
    ) -> bool {
        if meeting.meeting_url.is_empty() {
            debug!(meeting_id = %meeting.id, "new meeting has no joinable url, skipping");
            return false;
        }

        match self
            .provider
            .schedule_bot(&meeting.id, &meeting.meeting_url)
            .await
        {
            Ok(bot_id) => {
                info!(meeting_id = %meeting.id, bot_id = %bot_id, "scheduled bot for new meeting");
                bots.insert(
                    meeting.id.clone(),
                    BotRecord::scheduled(bot_id, meeting, now),
                );
                true
            }
            Err(error) => {
                // The meeting will sit in the stored snapshot unscheduled; it
                // is only retried if a tracked field changes later.
                warn!(meeting_id = %meeting.id, %error, "failed to schedule bot for new meeting");
                false
            }
        }
    }

    async fn reschedule_changed(
        &self,
        meeting: &Meeting,
        bots: &mut BTreeMap<String, BotRecord>,
        now: DateTime<Utc>,
    ) -> bool {
        let mut mutated = false;

        if let Some(record) = bots.get(&meeting.id) {
            if record.audio_processed {
                debug!(meeting_id = %meeting.id, "recording already captured, leaving bot record alone");
                return false;
            }
            let bot_id = record.bot_id.clone();
            if let Err(error) = self.provider.unschedule_bot(&bot_id).await {
                warn!(meeting_id = %meeting.id, bot_id, %error, "failed to unschedule bot for changed meeting");
            }
            bots.remove(&meeting.id);
            mutated = true;
        }

        if meeting.meeting_url.is_empty() {
            debug!(meeting_id = %meeting.id, "changed meeting lost its url, not rescheduling");
            return mutated;
        }

        match self
            .provider
            .schedule_bot(&meeting.id, &meeting.meeting_url)
            .await
        {
            Ok(bot_id) => {
                info!(meeting_id = %meeting.id, bot_id = %bot_id, "rescheduled bot for changed meeting");
                bots.insert(
                    meeting.id.clone(),
                    BotRecord::scheduled(bot_id, meeting, now),
                );
                true
            }
            Err(error) => {
                warn!(meeting_id = %meeting.id, %error, "failed to reschedule bot for changed meeting");
                mutated
            }
        }
    }

    async fn handle_removed(
        &self,
        meeting_id: &str,
        old_meetings: &[Meeting],
        bots: &mut BTreeMap<String, BotRecord>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(record) = bots.get_mut(meeting_id) else {
            debug!(meeting_id, "removed meeting had no bot record");
            return false;
        };

        let ended = old_meetings
            .iter()
            .find(|m| m.id == meeting_id)
            .map(|m| is_in_past(&m.end_time, now))
            .unwrap_or(false);

        if record.audio_processed || ended {
            // Keep the record so the capture pipeline can still pick up (or
            // keep serving) the finished recording; flag it for orphan checks.
            if record.meeting_removed {
                return false;
            }
            info!(meeting_id, "meeting removed after it ended, flagging for orphan sweep");
            record.meeting_removed = true;
            record.removed_at = Some(now);
            return true;
        }

        let bot_id = record.bot_id.clone();
        if let Err(error) = self.provider.unschedule_bot(&bot_id).await {
            warn!(meeting_id, bot_id, %error, "failed to unschedule bot for removed meeting");
        }
        info!(meeting_id, "meeting removed before it started, dropped bot record");
        bots.remove(meeting_id);
        true
    }
}
