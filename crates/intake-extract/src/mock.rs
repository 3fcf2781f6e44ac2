//! Mock extraction backend for deterministic testing.
//!
//! Records every call and replays a configured block list, letting pipeline
//! tests exercise gating and failure paths without a live service.
//!
//! ## Usage
//!
//! ```rust
//! use intake_extract::mock::MockExtractionBackend;
//! use intake_core::{Block, ExtractionBackend};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let backend = MockExtractionBackend::new().with_blocks(vec![
//!     Block::query("q1", "potassium", vec!["r1".to_string()]),
//!     Block::query_result("r1", "4.5 mg/dL", 92.0),
//! ]);
//!
//! let blocks = backend.analyze(b"pdf", &[]).await.unwrap();
//! assert_eq!(blocks.len(), 2);
//! assert_eq!(backend.call_count(), 1);
//! # }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use intake_core::{Block, Error, ExtractionBackend, FieldQuery, Result};

/// One recorded `analyze` invocation.
#[derive(Debug, Clone)]
pub struct AnalyzeCall {
    pub document_len: usize,
    pub query_keys: Vec<String>,
}

/// Mock extraction backend.
#[derive(Clone, Default)]
pub struct MockExtractionBackend {
    blocks: Vec<Block>,
    failure: Option<String>,
    call_log: Arc<Mutex<Vec<AnalyzeCall>>>,
}

impl MockExtractionBackend {
    /// Create a new mock backend returning an empty block list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the block list returned by every `analyze` call.
    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = blocks;
        self
    }

    /// Make every `analyze` call fail with the given message.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Number of `analyze` calls made so far.
    pub fn call_count(&self) -> usize {
        self.call_log.lock().map(|log| log.len()).unwrap_or(0)
    }

    /// Snapshot of all recorded calls.
    pub fn calls(&self) -> Vec<AnalyzeCall> {
        self.call_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ExtractionBackend for MockExtractionBackend {
    async fn analyze(&self, document: &[u8], queries: &[FieldQuery]) -> Result<Vec<Block>> {
        if let Ok(mut log) = self.call_log.lock() {
            log.push(AnalyzeCall {
                document_len: document.len(),
                query_keys: queries.iter().map(|q| q.key.to_string()).collect(),
            });
        }

        match &self.failure {
            Some(message) => Err(Error::Extraction(message.clone())),
            None => Ok(self.blocks.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::FIELD_QUERIES;

    #[tokio::test]
    async fn test_mock_replays_blocks_and_records_calls() {
        let backend = MockExtractionBackend::new()
            .with_blocks(vec![Block::query_result("r1", "140", 90.0)]);

        let blocks = backend.analyze(b"doc", FIELD_QUERIES).await.unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(backend.call_count(), 1);

        let calls = backend.calls();
        assert_eq!(calls[0].document_len, 3);
        assert_eq!(calls[0].query_keys.len(), FIELD_QUERIES.len());
    }

    #[tokio::test]
    async fn test_mock_failure_mode() {
        let backend = MockExtractionBackend::new().with_failure("service down");
        let err = backend.analyze(b"doc", &[]).await.unwrap_err();
        match err {
            Error::Extraction(msg) => assert_eq!(msg, "service down"),
            other => panic!("Expected Extraction error, got {:?}", other),
        }
        assert_eq!(backend.call_count(), 1);
    }
}
