use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use recap_domain::{OauthGrant, RecapError, Result};
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::capture::CapturePipeline;
use crate::ports::{CredentialProvider, RecordingProvider, StateStore};
use crate::reconcile::diff::diff_meetings;
use crate::reconcile::lifecycle::BotLifecycleManager;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub lookahead_days: i64,
    pub oauth_client_id: String,
    pub oauth_client_secret: String,
    pub platform: String,
}

/// Aggregate result of a full two-phase pass over every user.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub users: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub recordings_processed: usize,
    pub orphans_removed: usize,
}

/// Drives reconciliation: calendar sync per user, then capture per user.
///
/// A per-user async mutex serializes the two phases (and overlapping passes)
/// for the same user while letting different users proceed concurrently.
pub struct ReconcileOrchestrator {
    credentials: Arc<dyn CredentialProvider>,
    provider: Arc<dyn RecordingProvider>,
    state_store: Arc<dyn StateStore>,
    lifecycle: BotLifecycleManager,
    capture: CapturePipeline,
    config: OrchestratorConfig,
    user_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ReconcileOrchestrator {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        provider: Arc<dyn RecordingProvider>,
        state_store: Arc<dyn StateStore>,
        lifecycle: BotLifecycleManager,
        capture: CapturePipeline,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            credentials,
            provider,
            state_store,
            lifecycle,
            capture,
            config,
            user_locks: DashMap::new(),
        }
    }

    fn lock_for(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.user_locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Reconcile one user's calendar against the stored snapshot.
    #[instrument(skip(self))]
    pub async fn reconcile_user(&self, user_id: &str) -> Result<()> {
        let lock = self.lock_for(user_id);
        let _guard = lock.lock().await;

        let credential = self.credentials.refresh(user_id).await?;
        let mut state = self.state_store.load(user_id).await?;

        let calendar_id = match &state.recall_calendar_id {
            Some(id) => id.clone(),
            None => {
                let refresh_token = credential.refresh_token.clone().ok_or_else(|| {
                    RecapError::Auth(format!("no refresh token for {user_id}, cannot connect calendar"))
                })?;
                let grant = OauthGrant {
                    client_id: self.config.oauth_client_id.clone(),
                    client_secret: self.config.oauth_client_secret.clone(),
                    refresh_token,
                    platform: self.config.platform.clone(),
                };
                let id = self.provider.create_calendar_integration(&grant).await?;
                info!(user_id, calendar_id = %id, "connected calendar integration");
                state.recall_calendar_id = Some(id.clone());
                // Persist right away so a later failure in this pass does not
                // lose the integration id and create a duplicate next time.
                self.state_store.save(user_id, &state).await?;
                id
            }
        };

        let now = Utc::now();
        let window_end = now + Duration::days(self.config.lookahead_days);
        let meetings = self.provider.list_events(&calendar_id, now, window_end).await?;

        let diff = diff_meetings(&state.meetings, &meetings);
        if !diff.is_empty() {
            info!(
                user_id,
                new = diff.new.len(),
                changed = diff.changed.len(),
                removed = diff.removed.len(),
                "calendar snapshot drifted"
            );
        }

        self.lifecycle
            .apply(&diff, &state.meetings, &mut state.bots, now)
            .await;

        state.meetings = meetings;
        state.last_updated = Some(now);
        self.state_store.save(user_id, &state).await
    }

    /// One full pass: reconcile every user's calendar, then run the capture
    /// pipeline for every user. A user failing one phase never blocks the
    /// other users or the other phase.
    pub async fn run_pass(&self) -> Result<PassSummary> {
        let users = self.credentials.list_users().await?;
        let mut summary = PassSummary {
            users: users.len(),
            ..PassSummary::default()
        };

        for user_id in &users {
            match self.reconcile_user(user_id).await {
                Ok(()) => summary.succeeded += 1,
                Err(error) => {
                    error!(user_id, %error, "calendar reconciliation failed");
                    summary.failed += 1;
                }
            }
        }

        for user_id in &users {
            let lock = self.lock_for(user_id);
            let _guard = lock.lock().await;

            let mut state = match self.state_store.load(user_id).await {
                Ok(state) => state,
                Err(error) => {
                    warn!(user_id, %error, "could not load state for capture phase");
                    continue;
                }
            };

            let outcome = self.capture.process_finished(user_id, &mut state, Utc::now()).await;
            summary.recordings_processed += outcome.processed;
            summary.orphans_removed += outcome.orphans_removed;

            if outcome.changed {
                if let Err(error) = self.state_store.save(user_id, &state).await {
                    error!(user_id, %error, "failed to persist state after capture");
                }
            }
        }

        info!(
            users = summary.users,
            succeeded = summary.succeeded,
            failed = summary.failed,
            recordings = summary.recordings_processed,
            orphans = summary.orphans_removed,
            "reconciliation pass finished"
        );
        Ok(summary)
    }
}
