//! Shared handles for batch processing.

use std::sync::Arc;

use intake_core::{
    DocumentRepository, ExtractionBackend, ObjectStore, PipelineConfig, StagingRepository,
};

/// Everything one batch invocation needs: repositories, service backends,
/// and configuration. Cheap to clone; all backends are shared.
#[derive(Clone)]
pub struct PipelineContext {
    pub staging: Arc<dyn StagingRepository>,
    pub documents: Arc<dyn DocumentRepository>,
    pub store: Arc<dyn ObjectStore>,
    pub extraction: Arc<dyn ExtractionBackend>,
    pub config: PipelineConfig,
}

impl PipelineContext {
    pub fn new(
        staging: Arc<dyn StagingRepository>,
        documents: Arc<dyn DocumentRepository>,
        store: Arc<dyn ObjectStore>,
        extraction: Arc<dyn ExtractionBackend>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            staging,
            documents,
            store,
            extraction,
            config,
        }
    }
}
