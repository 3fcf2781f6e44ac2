//! Staging record repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use intake_core::{
    DocumentType, Error, InsertOutcome, NewStagingRecord, Result, ReviewDecision, ReviewStatus,
    StagingRecord, StagingRepository,
};

/// PostgreSQL implementation of StagingRepository.
#[derive(Clone)]
pub struct PgStagingRepository {
    pool: Pool<Postgres>,
}

impl PgStagingRepository {
    /// Create a new PgStagingRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Convert ReviewStatus to string for database.
    fn status_to_str(status: ReviewStatus) -> &'static str {
        match status {
            ReviewStatus::PendingReview => "pending_review",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
            ReviewStatus::NeedsCorrection => "needs_correction",
        }
    }

    /// Convert string from database to ReviewStatus.
    fn str_to_status(s: &str) -> ReviewStatus {
        match s {
            "pending_review" => ReviewStatus::PendingReview,
            "approved" => ReviewStatus::Approved,
            "rejected" => ReviewStatus::Rejected,
            "needs_correction" => ReviewStatus::NeedsCorrection,
            _ => ReviewStatus::PendingReview, // fallback
        }
    }

    /// Parse a staging row into a StagingRecord struct.
    fn parse_staging_row(row: sqlx::postgres::PgRow) -> Result<StagingRecord> {
        let fields_json: Option<JsonValue> = row.get("extracted_fields");
        let extracted_fields = match fields_json {
            Some(v) => Some(serde_json::from_value(v)?),
            None => None,
        };

        let final_document_type: Option<String> = row.get("final_document_type");

        Ok(StagingRecord {
            id: row.get("id"),
            patient_id: row.get("patient_id"),
            source_document_id: row.get("source_document_id"),
            document_type: DocumentType::from(row.get::<String, _>("document_type")),
            final_document_type: final_document_type.map(DocumentType::from),
            container: row.get("container"),
            object_key: row.get("object_key"),
            extracted_fields,
            lab_date: row.get("lab_date"),
            extraction_error: row.get("extraction_error"),
            status: Self::str_to_status(row.get("status")),
            reviewed_by: row.get("reviewed_by"),
            reviewed_at: row.get("reviewed_at"),
            admin_notes: row.get("admin_notes"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl StagingRepository for PgStagingRepository {
    async fn insert(&self, record: NewStagingRecord) -> Result<InsertOutcome> {
        let id = Uuid::now_v7();
        let now = Utc::now();
        let fields_json = match &record.extracted_fields {
            Some(fields) => Some(serde_json::to_value(fields)?),
            None => None,
        };

        // Idempotent on (container, object_key): event redelivery must not
        // create a second reviewable row.
        let inserted = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO staging_records (
                 id, patient_id, source_document_id, document_type,
                 container, object_key, extracted_fields, lab_date,
                 extraction_error, status, created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending_review', $10, $10)
             ON CONFLICT (container, object_key) DO NOTHING
             RETURNING id",
        )
        .bind(id)
        .bind(&record.patient_id)
        .bind(record.source_document_id)
        .bind(record.document_type.as_str())
        .bind(&record.locator.container)
        .bind(&record.locator.object_key)
        .bind(&fields_json)
        .bind(record.lab_date)
        .bind(&record.extraction_error)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        if let Some(id) = inserted {
            return Ok(InsertOutcome::Inserted(id));
        }

        let existing = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM staging_records WHERE container = $1 AND object_key = $2",
        )
        .bind(&record.locator.container)
        .bind(&record.locator.object_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| {
            Error::Internal(format!(
                "staging insert conflicted but no row found for {}",
                record.locator
            ))
        })?;

        Ok(InsertOutcome::Duplicate(existing))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<StagingRecord> {
        let row = sqlx::query("SELECT * FROM staging_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::StagingNotFound(id))?;

        Self::parse_staging_row(row)
    }

    async fn list_pending(&self, limit: i64, offset: i64) -> Result<Vec<StagingRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM staging_records
             WHERE status = 'pending_review'
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(Self::parse_staging_row).collect()
    }

    async fn record_review(&self, id: Uuid, decision: ReviewDecision) -> Result<StagingRecord> {
        if decision.status == ReviewStatus::PendingReview {
            return Err(Error::InvalidInput(
                "review cannot reset a record to pending_review".to_string(),
            ));
        }

        let now = Utc::now();
        let final_type = decision
            .final_document_type
            .as_ref()
            .map(|t| t.as_str().to_string());

        let row = sqlx::query(
            "UPDATE staging_records
             SET status = $2,
                 reviewed_by = $3,
                 final_document_type = $4,
                 admin_notes = $5,
                 reviewed_at = $6,
                 updated_at = $6
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(Self::status_to_str(decision.status))
        .bind(&decision.reviewed_by)
        .bind(final_type)
        .bind(&decision.admin_notes)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::StagingNotFound(id))?;

        Self::parse_staging_row(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_to_str_all_variants() {
        assert_eq!(
            PgStagingRepository::status_to_str(ReviewStatus::PendingReview),
            "pending_review"
        );
        assert_eq!(
            PgStagingRepository::status_to_str(ReviewStatus::Approved),
            "approved"
        );
        assert_eq!(
            PgStagingRepository::status_to_str(ReviewStatus::Rejected),
            "rejected"
        );
        assert_eq!(
            PgStagingRepository::status_to_str(ReviewStatus::NeedsCorrection),
            "needs_correction"
        );
    }

    #[test]
    fn test_str_to_status_round_trip() {
        for status in [
            ReviewStatus::PendingReview,
            ReviewStatus::Approved,
            ReviewStatus::Rejected,
            ReviewStatus::NeedsCorrection,
        ] {
            let s = PgStagingRepository::status_to_str(status);
            assert_eq!(PgStagingRepository::str_to_status(s), status);
        }
    }

    #[test]
    fn test_str_to_status_unknown_falls_back_to_pending() {
        assert_eq!(
            PgStagingRepository::str_to_status("bogus"),
            ReviewStatus::PendingReview
        );
    }
}
