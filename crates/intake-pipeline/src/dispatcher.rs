//! Extraction dispatch with eligibility gating.
//!
//! Only eligible document types reach the extraction service; everything
//! else is staged directly without fetching the object. Extraction failures
//! degrade to a captured error message so the record still stages.

use tracing::{debug, warn};

use intake_core::{DocumentType, ExtractionOutcome, StorageLocator};
use intake_extract::FIELD_QUERIES;

use crate::context::PipelineContext;

/// Run field extraction for one upload if its type is eligible.
///
/// Never returns an error: an ineligible type yields the empty outcome
/// without touching the object store or the extraction service, and any
/// fetch or service failure yields an outcome carrying the failure text.
pub async fn run_extraction(
    ctx: &PipelineContext,
    locator: &StorageLocator,
    document_type: &DocumentType,
) -> ExtractionOutcome {
    if !ctx.config.is_eligible(document_type) {
        debug!(
            subsystem = "pipeline",
            component = "dispatcher",
            container = %locator.container,
            object_key = %locator.object_key,
            document_type = %document_type,
            "Document type not extraction-eligible, staging directly"
        );
        return ExtractionOutcome::default();
    }

    let document = match ctx.store.fetch(locator).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(
                subsystem = "pipeline",
                component = "dispatcher",
                container = %locator.container,
                object_key = %locator.object_key,
                error = %e,
                "Object fetch failed, staging without extracted fields"
            );
            return ExtractionOutcome {
                fields: None,
                lab_date: None,
                error: Some(format!("object fetch failed: {}", e)),
            };
        }
    };

    let mime = infer::get(&document).map(|kind| kind.mime_type());
    debug!(
        subsystem = "pipeline",
        component = "dispatcher",
        container = %locator.container,
        object_key = %locator.object_key,
        doc_bytes = document.len(),
        mime = mime.unwrap_or("unknown"),
        "Dispatching document for extraction"
    );

    match ctx.extraction.analyze(&document, FIELD_QUERIES).await {
        Ok(blocks) => intake_extract::parse_blocks(&blocks, FIELD_QUERIES, &ctx.config),
        Err(e) => {
            warn!(
                subsystem = "pipeline",
                component = "dispatcher",
                container = %locator.container,
                object_key = %locator.object_key,
                error = %e,
                "Extraction failed, staging without extracted fields"
            );
            ExtractionOutcome {
                fields: None,
                lab_date: None,
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context_with, MemoryObjectStore};
    use intake_core::Block;
    use intake_extract::MockExtractionBackend;

    fn locator() -> StorageLocator {
        StorageLocator::new("referrals", "patients/p-1/documents/current_labs/g-1/labs.pdf")
    }

    #[tokio::test]
    async fn test_ineligible_type_skips_service_and_store() {
        let store = MemoryObjectStore::new();
        let extraction = MockExtractionBackend::new();
        let ctx = context_with(store.clone(), extraction.clone());

        let outcome = run_extraction(&ctx, &locator(), &DocumentType::InsuranceCard).await;

        assert!(outcome.fields.is_none());
        assert!(outcome.lab_date.is_none());
        assert!(outcome.error.is_none());
        assert_eq!(extraction.call_count(), 0);
        assert_eq!(store.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_eligible_type_runs_full_query_list() {
        let store = MemoryObjectStore::new().with_object(locator(), b"pdf bytes".to_vec());
        let extraction = MockExtractionBackend::new().with_blocks(vec![
            Block::query("q1", "potassium", vec!["r1".to_string()]),
            Block::query_result("r1", "4.5 mg/dL", 92.0),
        ]);
        let ctx = context_with(store, extraction.clone());

        let outcome = run_extraction(&ctx, &locator(), &DocumentType::CurrentLabs).await;

        assert_eq!(extraction.call_count(), 1);
        assert_eq!(extraction.calls()[0].query_keys.len(), FIELD_QUERIES.len());
        let fields = outcome.fields.expect("eligible document yields a field map");
        assert_eq!(fields.len(), FIELD_QUERIES.len() - 1);
        assert_eq!(
            fields.get("potassium").unwrap().as_ref().unwrap().value,
            "4.5"
        );
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_error_outcome() {
        let store = MemoryObjectStore::new().with_fetch_failure("store offline");
        let extraction = MockExtractionBackend::new();
        let ctx = context_with(store, extraction.clone());

        let outcome = run_extraction(&ctx, &locator(), &DocumentType::CurrentLabs).await;

        assert!(outcome.fields.is_none());
        assert!(outcome.error.as_deref().unwrap().contains("store offline"));
        assert_eq!(extraction.call_count(), 0);
    }

    #[tokio::test]
    async fn test_service_failure_degrades_to_error_outcome() {
        let store = MemoryObjectStore::new().with_object(locator(), b"pdf bytes".to_vec());
        let extraction = MockExtractionBackend::new().with_failure("analyze unavailable");
        let ctx = context_with(store, extraction.clone());

        let outcome = run_extraction(&ctx, &locator(), &DocumentType::CurrentLabs).await;

        assert!(outcome.fields.is_none());
        assert!(outcome.lab_date.is_none());
        assert!(outcome
            .error
            .as_deref()
            .unwrap()
            .contains("analyze unavailable"));
    }
}
