//! Calendar reconciliation: snapshot diffing, bot lifecycle transitions and
//! the per-user orchestration pass.

pub mod diff;
pub mod lifecycle;
pub mod orchestrator;

pub use diff::{diff_meetings, MeetingDiff};
pub use lifecycle::BotLifecycleManager;
pub use orchestrator::{OrchestratorConfig, PassSummary, ReconcileOrchestrator};
