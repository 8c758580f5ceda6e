//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! engine.

// Reconciliation window defaults
pub const DEFAULT_LOOKAHEAD_DAYS: i64 = 7;
pub const DEFAULT_ORPHAN_THRESHOLD_HOURS: i64 = 24;
/// Hourly, at the top of the hour.
pub const DEFAULT_SYNC_CRON: &str = "0 0 * * * *";

// Provider bot configuration
pub const DEFAULT_BOT_NAME: &str = "Recap Bot";
pub const BOT_AUTO_LEAVE_TIMEOUT_SECS: u32 = 150;
pub const EVENT_PAGE_LIMIT: usize = 100;

// Transcode parameters (stereo, fixed bitrate/sample rate)
pub const AUDIO_BITRATE: &str = "192k";
pub const AUDIO_SAMPLE_RATE: u32 = 44_100;
pub const AUDIO_CHANNELS: u32 = 2;

// Recorder bots excluded from participant lists
pub const EXCLUDED_PARTICIPANT_MARKERS: &[&str] = &["read.ai", "Fireflies.ai"];

// Meeting domains recognized in free-text location fields
pub const KNOWN_MEETING_DOMAINS: &[&str] =
    &["zoom.us", "teams.microsoft.com", "meet.google.com"];
