//! HTTP gateway adapter for the recording blob store.
//!
//! Talks to an S3-compatible gateway: `HEAD` to probe a key, `PUT` to upload
//! one, bearer token auth when configured.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use recap_core::BlobStore;
use recap_domain::{RecapError, Result, StorageConfig};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use crate::errors::InfraError;

pub struct HttpBlobStore {
    http: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpBlobStore {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        // Validate early so a malformed endpoint fails at startup, not on the
        // first upload.
        Url::parse(&config.blob_endpoint)
            .map_err(|e| RecapError::Config(format!("invalid blob endpoint: {e}")))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RecapError::Internal(format!("building HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.blob_endpoint.trim_end_matches('/').to_string(),
            token: config.blob_token.clone(),
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    #[instrument(skip(self))]
    async fn exists(&self, key: &str) -> Result<bool> {
        let response = self
            .authorize(self.http.head(self.url_for(key)))
            .send()
            .await
            .map_err(|e| RecapError::from(InfraError::from(e)))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(RecapError::Storage(format!("probing blob {key} failed ({status})"))),
        }
    }

    #[instrument(skip(self, local_path))]
    async fn upload(&self, local_path: &Path, key: &str, content_type: &str) -> Result<String> {
        let body = tokio::fs::read(local_path)
            .await
            .map_err(|e| RecapError::Storage(format!("reading {}: {e}", local_path.display())))?;
        let size = body.len();

        let response = self
            .authorize(self.http.put(self.url_for(key)))
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| RecapError::from(InfraError::from(e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(RecapError::Storage(format!("uploading blob {key} failed ({status})")));
        }

        debug!(key, size, "uploaded blob");
        Ok(self.url_for(key))
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{key}", self.endpoint)
    }
}
