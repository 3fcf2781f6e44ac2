//! Single-record processing: decode, resolve, extract, stage.

use tracing::{debug, info, warn};

use intake_core::{Disposition, NewStagingRecord, ObjectCreatedEvent, Result, StorageLocator};

use crate::context::PipelineContext;
use crate::dispatcher::run_extraction;
use crate::metadata::{decode_key, resolve_metadata};

/// Process one object-created event through to a staging row.
///
/// Exactly one staging record exists for the upload afterwards, whether
/// extraction succeeded, failed, or was skipped. Errors returned here are
/// fatal for this record only; the batch loop converts them to a failed
/// disposition.
pub async fn process_record(
    ctx: &PipelineContext,
    event: &ObjectCreatedEvent,
) -> Result<Disposition> {
    let decoded_key = decode_key(&event.object_key)?;
    let locator = StorageLocator::new(event.container.clone(), decoded_key);

    let tags = match ctx.store.tags(&locator).await {
        Ok(tags) => tags,
        Err(e) => {
            warn!(
                subsystem = "pipeline",
                component = "processor",
                container = %locator.container,
                object_key = %locator.object_key,
                error = %e,
                "Tag read failed, falling back to path convention"
            );
            Default::default()
        }
    };

    let metadata = resolve_metadata(&tags, &locator.object_key, &ctx.config)?;
    debug!(
        subsystem = "pipeline",
        component = "processor",
        container = %locator.container,
        object_key = %locator.object_key,
        patient_id = %metadata.patient_id,
        document_type = %metadata.document_type,
        source = ?metadata.source,
        "Resolved document metadata"
    );

    let source_document_id = match ctx.documents.find_by_location(&locator).await {
        Ok(doc) => doc.map(|d| d.id),
        Err(e) => {
            warn!(
                subsystem = "pipeline",
                component = "processor",
                container = %locator.container,
                object_key = %locator.object_key,
                error = %e,
                "Source document lookup failed, staging without back-reference"
            );
            None
        }
    };

    let outcome = run_extraction(ctx, &locator, &metadata.document_type).await;

    let record = NewStagingRecord {
        patient_id: metadata.patient_id,
        source_document_id,
        document_type: metadata.document_type,
        locator: locator.clone(),
        extracted_fields: outcome.fields,
        lab_date: outcome.lab_date,
        extraction_error: outcome.error,
    };

    let inserted = ctx.staging.insert(record).await?;
    let staging_id = inserted.staging_id();

    match inserted {
        intake_core::InsertOutcome::Inserted(_) => {
            info!(
                subsystem = "pipeline",
                component = "processor",
                op = "process_record",
                container = %locator.container,
                object_key = %locator.object_key,
                staging_id = %staging_id,
                "Staged record for review"
            );
            Ok(Disposition::Staged { staging_id })
        }
        intake_core::InsertOutcome::Duplicate(_) => {
            info!(
                subsystem = "pipeline",
                component = "processor",
                op = "process_record",
                container = %locator.container,
                object_key = %locator.object_key,
                staging_id = %staging_id,
                "Duplicate delivery, staging row already exists"
            );
            Ok(Disposition::Duplicate { staging_id })
        }
    }
}
