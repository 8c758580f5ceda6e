//! Cron-driven scheduler for the all-users reconciliation pass.
//!
//! Join handles are tracked, cancellation is explicit, and every asynchronous
//! operation is wrapped in a timeout. `run_on_start` fires one pass right
//! after the scheduler starts instead of waiting for the first cron tick.

use std::sync::Arc;
use std::time::{Duration, Instant};

use recap_core::ReconcileOrchestrator;
use recap_domain::constants::DEFAULT_SYNC_CRON;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the reconciliation scheduler.
#[derive(Debug, Clone)]
pub struct SyncSchedulerConfig {
    /// Cron expression describing the execution schedule.
    pub cron_expression: String,
    /// Run one pass immediately at start.
    pub run_on_start: bool,
    /// Timeout applied to a single full pass.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
    /// Timeout for awaiting spawned task join handles.
    pub join_timeout: Duration,
}

impl Default for SyncSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: DEFAULT_SYNC_CRON.to_string(),
            run_on_start: true,
            job_timeout: Duration::from_secs(1800),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Reconciliation scheduler with explicit lifecycle management.
pub struct SyncScheduler {
    scheduler: Option<JobScheduler>,
    config: SyncSchedulerConfig,
    orchestrator: Arc<ReconcileOrchestrator>,
    monitor_handle: Option<JoinHandle<()>>,
    startup_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
}

impl SyncScheduler {
    pub fn new(config: SyncSchedulerConfig, orchestrator: Arc<ReconcileOrchestrator>) -> Self {
        Self {
            scheduler: None,
            config,
            orchestrator,
            monitor_handle: None,
            startup_handle: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Start the scheduler, spawning the monitor task and, when configured,
    /// one immediate pass.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler_instance = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        let start_result = tokio::time::timeout(start_timeout, scheduler_instance.start())
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: start_timeout.as_secs() })?;
        start_result.map_err(|source| SchedulerError::StartFailed(source.to_string()))?;

        self.scheduler = Some(scheduler_instance);

        let cancel = self.cancellation.clone();
        self.monitor_handle = Some(tokio::spawn(async move {
            Self::monitor_task(cancel).await;
        }));

        if self.config.run_on_start {
            let orchestrator = self.orchestrator.clone();
            let job_timeout = self.config.job_timeout;
            let cancel = self.cancellation.clone();
            self.startup_handle = Some(tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("Startup pass cancelled before it ran");
                    }
                    _ = Self::perform_pass(orchestrator, job_timeout) => {}
                }
            }));
        }

        info!(cron = %self.config.cron_expression, "Reconciliation scheduler started");
        Ok(())
    }

    /// Stop the scheduler and wait for the spawned tasks to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        let mut scheduler = match self.scheduler.take() {
            Some(scheduler) => scheduler,
            None => return Err(SchedulerError::NotRunning),
        };

        let stop_timeout = self.config.stop_timeout;
        let stop_result =
            tokio::time::timeout(stop_timeout, async move { scheduler.shutdown().await })
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: stop_timeout.as_secs() })?;
        stop_result.map_err(|source| SchedulerError::StopFailed(source.to_string()))?;

        let join_timeout = self.config.join_timeout;
        for handle in [self.startup_handle.take(), self.monitor_handle.take()].into_iter().flatten()
        {
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })?
                .map_err(|e| SchedulerError::TaskJoinFailed(e.to_string()))?;
        }

        info!("Reconciliation scheduler stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    /// Returns true when a scheduler instance is active.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|source| SchedulerError::CreationFailed(source.to_string()))?;

        let cron_expr = self.config.cron_expression.clone();
        let orchestrator = self.orchestrator.clone();
        let job_timeout = self.config.job_timeout;

        let job_definition = Job::new_async(cron_expr.as_str(), move |_id, _lock| {
            let orchestrator = orchestrator.clone();
            Box::pin(async move {
                Self::perform_pass(orchestrator, job_timeout).await;
            })
        })
        .map_err(|source| SchedulerError::JobRegistrationFailed(source.to_string()))?;

        let job_id = job_definition.guid();
        scheduler
            .add(job_definition)
            .await
            .map_err(|source| SchedulerError::JobRegistrationFailed(source.to_string()))?;

        debug!(cron = %self.config.cron_expression, job_id = %job_id, "Registered reconciliation job");
        Ok(scheduler)
    }

    async fn perform_pass(orchestrator: Arc<ReconcileOrchestrator>, job_timeout: Duration) {
        let started = Instant::now();

        match tokio::time::timeout(job_timeout, orchestrator.run_pass()).await {
            Ok(Ok(summary)) => {
                info!(
                    users = summary.users,
                    succeeded = summary.succeeded,
                    failed = summary.failed,
                    recordings = summary.recordings_processed,
                    orphans = summary.orphans_removed,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Reconciliation pass completed"
                );
            }
            Ok(Err(err)) => {
                error!(error = %err, "Reconciliation pass failed");
            }
            Err(_) => {
                warn!(timeout_secs = job_timeout.as_secs(), "Reconciliation pass timed out");
            }
        }
    }

    async fn monitor_task(cancel: CancellationToken) {
        cancel.cancelled().await;
        debug!("Reconciliation scheduler monitor cancelled");
    }
}
