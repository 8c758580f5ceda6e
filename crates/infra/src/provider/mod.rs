//! Recording/calendar provider integration.

mod client;
mod types;

pub use client::RecallClient;
