//! Source document lookup repository.
//!
//! The upload endpoint writes one row per uploaded document. The pipeline
//! reads that table to link staging records back to their originating
//! upload. The lookup is best-effort: a missing row degrades the linkage,
//! never the staging insert.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use intake_core::{
    DocumentRepository, DocumentType, Error, Result, SourceDocument, StorageLocator,
};

/// PostgreSQL implementation of DocumentRepository.
#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: Pool<Postgres>,
}

impl PgDocumentRepository {
    /// Create a new PgDocumentRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_document_row(row: sqlx::postgres::PgRow) -> SourceDocument {
        SourceDocument {
            id: row.get("id"),
            patient_id: row.get("patient_id"),
            container: row.get("container"),
            object_key: row.get("object_key"),
            document_type: DocumentType::from(row.get::<String, _>("document_type")),
            uploaded_at: row.get("uploaded_at"),
        }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn find_by_location(&self, locator: &StorageLocator) -> Result<Option<SourceDocument>> {
        let row = sqlx::query(
            "SELECT id, patient_id, container, object_key, document_type, uploaded_at
             FROM patient_documents
             WHERE container = $1 AND object_key = $2
             ORDER BY uploaded_at DESC
             LIMIT 1",
        )
        .bind(&locator.container)
        .bind(&locator.object_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(Self::parse_document_row))
    }
}
