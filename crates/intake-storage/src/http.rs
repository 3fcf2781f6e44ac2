//! HTTP storage gateway client.
//!
//! Talks to the internal object-store gateway:
//! - `GET /v1/objects/{container}/{key}` returns `{"content": "<base64>"}`
//! - `GET /v1/objects/{container}/{key}/tags` returns a string map
//!
//! Object keys contain slashes, so they are percent-encoded into a single
//! path segment.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use intake_core::{defaults, Error, ObjectStore, Result, StorageLocator};

#[derive(Debug, Deserialize)]
struct ObjectContentResponse {
    content: String,
}

/// Storage gateway client.
pub struct HttpObjectStore {
    client: Client,
    base_url: String,
}

impl HttpObjectStore {
    /// Create a new gateway client with the default request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(
            base_url,
            Duration::from_secs(defaults::STORE_TIMEOUT_SECS),
        )
    }

    /// Create a new gateway client with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create from the `STORAGE_BASE_URL` environment variable.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(defaults::ENV_STORAGE_BASE_URL).map_err(|_| {
            Error::Config(format!("missing {}", defaults::ENV_STORAGE_BASE_URL))
        })?;
        Ok(Self::new(base_url))
    }

    fn object_url(&self, locator: &StorageLocator) -> String {
        format!(
            "{}/v1/objects/{}/{}",
            self.base_url,
            urlencoding::encode(&locator.container),
            urlencoding::encode(&locator.object_key)
        )
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn fetch(&self, locator: &StorageLocator) -> Result<Vec<u8>> {
        let url = self.object_url(locator);
        debug!(
            subsystem = "storage",
            component = "gateway",
            op = "fetch",
            container = %locator.container,
            object_key = %locator.object_key,
            "Fetching object"
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("object {}", locator)));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!(
                "Gateway returned {}: {}",
                status, body
            )));
        }

        let result: ObjectContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Storage(format!("Failed to parse response: {}", e)))?;

        base64::engine::general_purpose::STANDARD
            .decode(result.content.as_bytes())
            .map_err(|e| Error::Storage(format!("Invalid base64 content: {}", e)))
    }

    async fn tags(&self, locator: &StorageLocator) -> Result<HashMap<String, String>> {
        let url = format!("{}/tags", self.object_url(locator));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Request failed: {}", e)))?;

        // Untagged objects are a normal case, not an error.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(HashMap::new());
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!(
                "Gateway returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Storage(format!("Failed to parse tags: {}", e)))
    }
}
