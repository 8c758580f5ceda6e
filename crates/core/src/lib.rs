//! # Recap Core
//!
//! Pure reconciliation logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the provider, blob store,
//!   credential source, state store and transcoder
//! - The meeting diff engine
//! - The bot lifecycle manager
//! - The capture pipeline for finished recordings
//! - The per-user / all-users reconciliation orchestrator
//!
//! ## Architecture Principles
//! - Only depends on `recap-domain`
//! - No HTTP or process-spawning code
//! - All external systems reached via traits
//! - Pure, testable business logic

pub mod capture;
pub mod ports;
pub mod reconcile;

// Re-export specific items to avoid ambiguity
pub use capture::{CaptureOutcome, CapturePipeline};
pub use ports::{
    AudioTranscoder, BlobStore, CredentialProvider, RecordingProvider, StateStore,
};
pub use reconcile::diff::{diff_meetings, MeetingDiff};
pub use reconcile::lifecycle::BotLifecycleManager;
pub use reconcile::orchestrator::{OrchestratorConfig, PassSummary, ReconcileOrchestrator};

#[cfg(test)]
pub(crate) mod test_support;
