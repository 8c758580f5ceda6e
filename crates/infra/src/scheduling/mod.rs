//! Scheduling infrastructure for the periodic reconciliation pass.
//!
//! One cron-driven scheduler with explicit lifecycle management: start/stop,
//! a tracked monitor join handle, cancellation token support and timeout
//! wrapping on every async operation.

pub mod error;
pub mod sync_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use sync_scheduler::{SyncScheduler, SyncSchedulerConfig};
