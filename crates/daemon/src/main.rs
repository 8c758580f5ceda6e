//! recapd - calendar-to-recording reconciliation daemon.
//!
//! Wires the infrastructure adapters into the core orchestrator and drives
//! it with the cron scheduler until a shutdown signal arrives.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use recap_core::{
    BotLifecycleManager, CapturePipeline, OrchestratorConfig, ReconcileOrchestrator,
};
use recap_infra::{
    config, FfmpegTranscoder, HttpBlobStore, JsonStateStore, OauthCredentialProvider, RecallClient,
    SyncScheduler, SyncSchedulerConfig,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before tracing so RUST_LOG from the file takes effect.
    if let Ok(path) = dotenvy::dotenv() {
        eprintln!("loaded environment from {}", path.display());
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = config::load().context("loading configuration")?;
    info!(
        cron = %cfg.engine.cron_expression,
        lookahead_days = cfg.engine.lookahead_days,
        "recapd starting"
    );

    let provider = Arc::new(RecallClient::new(&cfg.provider)?);
    let credentials = Arc::new(OauthCredentialProvider::new(&cfg.oauth)?);
    let state_store = Arc::new(JsonStateStore::new(&cfg.storage.state_dir));
    let blob = Arc::new(HttpBlobStore::new(&cfg.storage)?);
    let transcoder = Arc::new(FfmpegTranscoder::new());

    let lifecycle = BotLifecycleManager::new(provider.clone());
    let capture = CapturePipeline::new(
        provider.clone(),
        blob,
        transcoder,
        PathBuf::from(&cfg.storage.work_dir),
        chrono::Duration::hours(cfg.engine.orphan_threshold_hours),
    );
    let orchestrator = Arc::new(ReconcileOrchestrator::new(
        credentials,
        provider,
        state_store,
        lifecycle,
        capture,
        OrchestratorConfig {
            lookahead_days: cfg.engine.lookahead_days,
            oauth_client_id: cfg.oauth.client_id.clone(),
            oauth_client_secret: cfg.oauth.client_secret.clone(),
            platform: "google_calendar".to_string(),
        },
    ));

    let mut scheduler = SyncScheduler::new(
        SyncSchedulerConfig {
            cron_expression: cfg.engine.cron_expression.clone(),
            run_on_start: cfg.engine.run_on_start,
            ..SyncSchedulerConfig::default()
        },
        orchestrator,
    );
    scheduler.start().await.context("starting scheduler")?;

    info!("recapd running");
    tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
    info!("shutdown signal received");

    if let Err(error) = scheduler.stop().await {
        warn!(%error, "scheduler did not stop cleanly");
    }
    Ok(())
}
