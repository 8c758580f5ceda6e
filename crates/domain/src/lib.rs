//! # Recap Domain
//!
//! Business domain types and models for the reconciliation engine.
//!
//! This crate contains:
//! - Domain data types (Meeting, BotRecord, UserSyncState, and friends)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Pure parsing utilities (meeting URL extraction, timestamp handling)
//!
//! ## Architecture
//! - No dependencies on other recap crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
// Re-export parsing utilities
pub use utils::meeting_url::extract_meeting_url;
pub use utils::time::{is_in_past, parse_provider_timestamp};
