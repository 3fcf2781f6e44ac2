//! Extraction service HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use tracing::{debug, warn};

use intake_core::{
    defaults, AnalyzeRequest, AnalyzeResponse, Block, Error, ExtractionBackend, FieldQuery, Result,
};

/// Client for the document field extraction service.
pub struct HttpExtractionBackend {
    client: Client,
    base_url: String,
}

impl HttpExtractionBackend {
    /// Create a new client with the default request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(
            base_url,
            Duration::from_secs(defaults::EXTRACT_TIMEOUT_SECS),
        )
    }

    /// Create a new client with a custom request timeout.
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

    /// Create from the `EXTRACT_BASE_URL` environment variable, falling back
    /// to the default local address.
    pub fn from_env() -> Self {
        let base_url = std::env::var(defaults::ENV_EXTRACT_BASE_URL)
            .unwrap_or_else(|_| defaults::EXTRACT_BASE_URL.to_string());
        Self::new(base_url)
    }
}

#[async_trait]
impl ExtractionBackend for HttpExtractionBackend {
    async fn analyze(&self, document: &[u8], queries: &[FieldQuery]) -> Result<Vec<Block>> {
        if document.len() > defaults::MAX_DOCUMENT_BYTES {
            return Err(Error::Extraction(format!(
                "document is {} bytes, limit is {}",
                document.len(),
                defaults::MAX_DOCUMENT_BYTES
            )));
        }

        let start = std::time::Instant::now();
        let request = AnalyzeRequest {
            document: base64::engine::general_purpose::STANDARD.encode(document),
            queries,
        };

        let response = self
            .client
            .post(format!("{}/v1/analyze", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Extraction(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Extraction(format!(
                "Extraction service returned {}: {}",
                status, body
            )));
        }

        let result: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| Error::Extraction(format!("Failed to parse response: {}", e)))?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            subsystem = "extract",
            component = "analyze_client",
            op = "analyze",
            block_count = result.blocks.len(),
            doc_bytes = document.len(),
            duration_ms = elapsed,
            "Analyze complete"
        );
        if elapsed > 30_000 {
            warn!(
                subsystem = "extract",
                component = "analyze_client",
                duration_ms = elapsed,
                slow = true,
                "Slow extraction request"
            );
        }

        Ok(result.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::FIELD_QUERIES;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_analyze_posts_base64_document() {
        let server = MockServer::start().await;
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"pdf bytes");
        Mock::given(method("POST"))
            .and(path("/v1/analyze"))
            .and(body_partial_json(serde_json::json!({ "document": encoded })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "blocks": [
                    {
                        "id": "q1",
                        "block_type": "QUERY",
                        "alias": "potassium",
                        "relationships": [{ "type": "ANSWER", "ids": ["r1"] }]
                    },
                    {
                        "id": "r1",
                        "block_type": "QUERY_RESULT",
                        "text": "4.5 mg/dL",
                        "confidence": 92.3
                    }
                ]
            })))
            .mount(&server)
            .await;

        let backend = HttpExtractionBackend::new(server.uri());
        let blocks = backend.analyze(b"pdf bytes", FIELD_QUERIES).await.unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].text.as_deref(), Some("4.5 mg/dL"));
    }

    #[tokio::test]
    async fn test_analyze_service_error_maps_to_extraction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("unsupported format"))
            .mount(&server)
            .await;

        let backend = HttpExtractionBackend::new(server.uri());
        let err = backend.analyze(b"zip bytes", FIELD_QUERIES).await.unwrap_err();
        match err {
            Error::Extraction(msg) => {
                assert!(msg.contains("422"));
                assert!(msg.contains("unsupported format"));
            }
            other => panic!("Expected Extraction error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_analyze_rejects_oversized_document() {
        let backend = HttpExtractionBackend::new("http://localhost:1");
        let oversized = vec![0u8; defaults::MAX_DOCUMENT_BYTES + 1];
        let err = backend.analyze(&oversized, FIELD_QUERIES).await.unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }
}
