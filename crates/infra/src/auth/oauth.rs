//! File-backed OAuth credential provider.
//!
//! Tokens live as one `{user_id}.json` document per user under the
//! configured token directory. Refreshing a near-expiry token rewrites the
//! document so the next pass starts from the new expiry.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recap_core::CredentialProvider;
use recap_domain::{Credential, OauthConfig, RecapError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

/// Refresh tokens expiring within this margin.
const REFRESH_MARGIN_SECS: i64 = 300;

#[derive(Debug, Serialize, Deserialize)]
struct TokenDocument {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

pub struct OauthCredentialProvider {
    http: Client,
    token_endpoint: String,
    client_id: String,
    client_secret: String,
    token_dir: PathBuf,
}

impl OauthCredentialProvider {
    pub fn new(config: &OauthConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RecapError::Internal(format!("building HTTP client: {e}")))?;

        Ok(Self {
            http,
            token_endpoint: config.token_endpoint.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token_dir: PathBuf::from(&config.token_dir),
        })
    }

    fn token_path(&self, user_id: &str) -> PathBuf {
        self.token_dir.join(format!("{user_id}.json"))
    }

    async fn read_document(&self, user_id: &str) -> Result<TokenDocument> {
        let path = self.token_path(user_id);
        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            RecapError::Auth(format!("no stored credential for {}: {e}", redact_user(user_id)))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            RecapError::Auth(format!("corrupt token document for {}: {e}", redact_user(user_id)))
        })
    }

    // Write-then-rename so a crash mid-write never leaves a truncated
    // document behind.
    async fn write_document(&self, user_id: &str, document: &TokenDocument) -> Result<()> {
        let encoded = serde_json::to_vec_pretty(document)
            .map_err(|e| RecapError::Internal(format!("encoding token document: {e}")))?;
        let path = self.token_path(user_id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, encoded)
            .await
            .map_err(|e| RecapError::Storage(format!("writing token document: {e}")))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| RecapError::Storage(format!("replacing token document: {e}")))
    }

    async fn refresh_remote(&self, refresh_token: &str) -> Result<TokenResponse> {
        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| RecapError::Auth(format!("token refresh request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(RecapError::Auth(format!("token refresh failed ({status}): {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| RecapError::Auth(format!("invalid token response: {e}")))
    }
}

#[async_trait]
impl CredentialProvider for OauthCredentialProvider {
    #[instrument(skip(self), fields(user = %redact_user(user_id)))]
    async fn refresh(&self, user_id: &str) -> Result<Credential> {
        let mut document = self.read_document(user_id).await?;
        let now = Utc::now();

        let current = Credential {
            access_token: document.access_token.clone(),
            refresh_token: document.refresh_token.clone(),
            expires_at: document.expires_at,
        };

        if !current.needs_refresh(now, REFRESH_MARGIN_SECS) {
            debug!("stored credential still fresh");
            return Ok(current);
        }

        let Some(refresh_token) = document.refresh_token.clone() else {
            // Without a refresh token the stored access token is all we have.
            return Ok(current);
        };

        let refreshed = self.refresh_remote(&refresh_token).await?;
        document.access_token = refreshed.access_token;
        document.expires_at =
            refreshed.expires_in.map(|secs| now + chrono::Duration::seconds(secs));
        if let Some(new_refresh) = refreshed.refresh_token {
            document.refresh_token = Some(new_refresh);
        }
        self.write_document(user_id, &document).await?;
        info!("refreshed credential");

        Ok(Credential {
            access_token: document.access_token,
            refresh_token: document.refresh_token,
            expires_at: document.expires_at,
        })
    }

    async fn list_users(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.token_dir)
            .await
            .map_err(|e| RecapError::Storage(format!("reading token directory: {e}")))?;

        let mut users = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RecapError::Storage(format!("reading token directory: {e}")))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                users.push(stem.to_string());
            }
        }

        users.sort();
        Ok(users)
    }
}

/// Salted hash tag for user identifiers in logs.
fn redact_user(user_id: &str) -> String {
    const USER_HASH_SALT: &[u8] = b"recap-auth-user-salt";
    let mut hasher = Sha256::new();
    hasher.update(USER_HASH_SALT);
    hasher.update(user_id.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("user-{}", &digest[..12])
}
