//! Batch loop with per-record isolation.
//!
//! Records process sequentially. Each record gets its own timeout; one
//! record's failure never touches its neighbors. Records not started before
//! the batch deadline are reported unprocessed so the event source
//! redelivers only those.

use std::time::Instant;

use tokio::time::timeout;
use tracing::{info, warn};

use intake_core::{BatchReport, Disposition, EventBatch, RecordOutcome};

use crate::context::PipelineContext;
use crate::processor::process_record;

/// Process a batch of object-created events and report every disposition.
///
/// Never returns an error: per-record failures become failed dispositions
/// in the report.
pub async fn process_batch(ctx: &PipelineContext, batch: &EventBatch) -> BatchReport {
    let start = Instant::now();
    let mut outcomes = Vec::with_capacity(batch.records.len());

    for event in &batch.records {
        let disposition = if start.elapsed() >= ctx.config.batch_deadline {
            warn!(
                subsystem = "pipeline",
                component = "batch",
                container = %event.container,
                object_key = %event.object_key,
                "Batch deadline reached, leaving record unprocessed"
            );
            Disposition::Unprocessed
        } else {
            match timeout(ctx.config.record_timeout, process_record(ctx, event)).await {
                Ok(Ok(disposition)) => disposition,
                Ok(Err(e)) => {
                    warn!(
                        subsystem = "pipeline",
                        component = "batch",
                        container = %event.container,
                        object_key = %event.object_key,
                        error = %e,
                        "Record failed"
                    );
                    Disposition::Failed {
                        error: e.to_string(),
                    }
                }
                Err(_) => {
                    warn!(
                        subsystem = "pipeline",
                        component = "batch",
                        container = %event.container,
                        object_key = %event.object_key,
                        timeout_secs = ctx.config.record_timeout.as_secs(),
                        "Record timed out"
                    );
                    Disposition::Failed {
                        error: format!(
                            "record timed out after {}s",
                            ctx.config.record_timeout.as_secs()
                        ),
                    }
                }
            }
        };

        outcomes.push(RecordOutcome {
            container: event.container.clone(),
            object_key: event.object_key.clone(),
            disposition,
        });
    }

    let report = BatchReport::from_outcomes(outcomes);
    info!(
        subsystem = "pipeline",
        component = "batch",
        op = "process_batch",
        record_count = report.total,
        staged = report.staged,
        duplicates = report.duplicates,
        failed = report.failed,
        unprocessed = report.unprocessed,
        duration_ms = start.elapsed().as_millis() as u64,
        "Batch complete"
    );
    report
}
