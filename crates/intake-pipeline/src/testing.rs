//! In-memory trait implementations for pipeline tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use intake_core::{
    DocumentRepository, Error, ExtractionBackend, InsertOutcome, NewStagingRecord, ObjectStore,
    PipelineConfig, Result, ReviewDecision, SourceDocument, StagingRecord, StagingRepository,
    StorageLocator,
};
use intake_extract::MockExtractionBackend;

use crate::context::PipelineContext;

/// Staging repository backed by a vector, idempotent on storage location.
#[derive(Clone, Default)]
pub struct MemoryStagingRepository {
    rows: Arc<Mutex<Vec<(Uuid, NewStagingRecord)>>>,
    failure: Option<String>,
}

impl MemoryStagingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Snapshot of every inserted record, in insert order.
    pub fn inserted(&self) -> Vec<NewStagingRecord> {
        self.rows
            .lock()
            .map(|rows| rows.iter().map(|(_, r)| r.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl StagingRepository for MemoryStagingRepository {
    async fn insert(&self, record: NewStagingRecord) -> Result<InsertOutcome> {
        if let Some(message) = &self.failure {
            return Err(Error::Internal(message.clone()));
        }
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| Error::Internal("staging mock poisoned".to_string()))?;
        if let Some((id, _)) = rows.iter().find(|(_, r)| r.locator == record.locator) {
            return Ok(InsertOutcome::Duplicate(*id));
        }
        let id = Uuid::now_v7();
        rows.push((id, record));
        Ok(InsertOutcome::Inserted(id))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<StagingRecord> {
        Err(Error::StagingNotFound(id))
    }

    async fn list_pending(&self, _limit: i64, _offset: i64) -> Result<Vec<StagingRecord>> {
        Ok(Vec::new())
    }

    async fn record_review(&self, id: Uuid, _decision: ReviewDecision) -> Result<StagingRecord> {
        Err(Error::StagingNotFound(id))
    }
}

/// Document repository with a fixed lookup table.
#[derive(Clone, Default)]
pub struct MemoryDocumentRepository {
    documents: HashMap<StorageLocator, SourceDocument>,
    failure: Option<String>,
}

impl MemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, locator: StorageLocator, document: SourceDocument) -> Self {
        self.documents.insert(locator, document);
        self
    }

    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }
}

#[async_trait]
impl DocumentRepository for MemoryDocumentRepository {
    async fn find_by_location(&self, locator: &StorageLocator) -> Result<Option<SourceDocument>> {
        match &self.failure {
            Some(message) => Err(Error::Internal(message.clone())),
            None => Ok(self.documents.get(locator).cloned()),
        }
    }
}

/// Object store with configured objects and tag sets.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: HashMap<StorageLocator, Vec<u8>>,
    tags: HashMap<StorageLocator, HashMap<String, String>>,
    fetch_failure: Option<String>,
    tags_failure: Option<String>,
    fetches: Arc<Mutex<usize>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, locator: StorageLocator, bytes: Vec<u8>) -> Self {
        self.objects.insert(locator, bytes);
        self
    }

    pub fn with_tags(mut self, locator: StorageLocator, pairs: &[(&str, &str)]) -> Self {
        self.tags.insert(
            locator,
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    pub fn with_fetch_failure(mut self, message: impl Into<String>) -> Self {
        self.fetch_failure = Some(message.into());
        self
    }

    pub fn with_tags_failure(mut self, message: impl Into<String>) -> Self {
        self.tags_failure = Some(message.into());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().map(|n| *n).unwrap_or(0)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn fetch(&self, locator: &StorageLocator) -> Result<Vec<u8>> {
        if let Ok(mut n) = self.fetches.lock() {
            *n += 1;
        }
        if let Some(message) = &self.fetch_failure {
            return Err(Error::Storage(message.clone()));
        }
        self.objects
            .get(locator)
            .cloned()
            .ok_or_else(|| Error::NotFound(locator.to_string()))
    }

    async fn tags(&self, locator: &StorageLocator) -> Result<HashMap<String, String>> {
        match &self.tags_failure {
            Some(message) => Err(Error::Storage(message.clone())),
            None => Ok(self.tags.get(locator).cloned().unwrap_or_default()),
        }
    }
}

/// Context over the in-memory staging and document repositories.
pub fn context(
    staging: MemoryStagingRepository,
    store: MemoryObjectStore,
    extraction: MockExtractionBackend,
) -> PipelineContext {
    context_full(staging, MemoryDocumentRepository::new(), store, extraction)
}

/// Context with only service backends of interest; staging is fresh.
pub fn context_with(store: MemoryObjectStore, extraction: MockExtractionBackend) -> PipelineContext {
    context(MemoryStagingRepository::new(), store, extraction)
}

pub fn context_full(
    staging: MemoryStagingRepository,
    documents: MemoryDocumentRepository,
    store: MemoryObjectStore,
    extraction: MockExtractionBackend,
) -> PipelineContext {
    PipelineContext::new(
        Arc::new(staging),
        Arc::new(documents),
        Arc::new(store),
        Arc::new(extraction),
        PipelineConfig::default(),
    )
}

/// Extraction backend that never completes, for timeout tests.
#[derive(Clone, Default)]
pub struct HangingExtractionBackend;

#[async_trait]
impl ExtractionBackend for HangingExtractionBackend {
    async fn analyze(
        &self,
        _document: &[u8],
        _queries: &[intake_core::FieldQuery],
    ) -> Result<Vec<intake_core::Block>> {
        std::future::pending().await
    }
}
