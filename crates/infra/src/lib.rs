//! # Recap Infrastructure
//!
//! Infrastructure implementations of the core reconciliation ports.
//!
//! This crate contains:
//! - The recording/calendar provider HTTP client
//! - OAuth credential storage and refresh
//! - Persisted per-user state (JSON documents) and the blob-store gateway
//! - The ffmpeg audio transcoder
//! - The cron-driven reconciliation scheduler
//!
//! ## Architecture
//! - Implements traits defined in `recap-core`
//! - Depends on `recap-domain` and `recap-core`
//! - Contains all "impure" code (HTTP, filesystem, process spawning)

pub mod auth;
pub mod config;
pub mod errors;
pub mod media;
pub mod provider;
pub mod scheduling;
pub mod storage;

// Re-export commonly used items
pub use auth::OauthCredentialProvider;
pub use errors::InfraError;
pub use media::FfmpegTranscoder;
pub use provider::RecallClient;
pub use scheduling::{SyncScheduler, SyncSchedulerConfig};
pub use storage::{HttpBlobStore, JsonStateStore};
