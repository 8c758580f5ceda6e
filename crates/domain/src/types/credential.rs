//! Credential types exchanged with the identity provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A refreshed, usable access credential for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// True when the credential expires within `margin_secs` (or carries no
    /// expiry at all, which is treated as stale).
    pub fn needs_refresh(&self, now: DateTime<Utc>, margin_secs: i64) -> bool {
        match self.expires_at {
            Some(expiry) => expiry <= now + chrono::Duration::seconds(margin_secs),
            None => true,
        }
    }
}

/// OAuth grant material handed to the provider when creating a calendar
/// integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OauthGrant {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// Calendar platform identifier, e.g. `google_calendar`.
    pub platform: String,
}
