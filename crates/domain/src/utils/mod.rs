//! Pure parsing utilities shared across the engine.

pub mod meeting_url;
pub mod time;
