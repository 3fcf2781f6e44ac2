//! Core data models shared across the intake crates.
//!
//! The central entity is [`StagingRecord`]: one reviewable row per processed
//! upload, written by the pipeline with status `PendingReview` and advanced
//! only by the downstream reviewer collaborator.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

// ============================================================================
// Storage location
// ============================================================================

/// A fully decoded object location: container plus object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageLocator {
    /// Storage container (bucket) name.
    pub container: String,
    /// Object key, percent-decoding already applied.
    pub object_key: String,
}

impl StorageLocator {
    pub fn new(container: impl Into<String>, object_key: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            object_key: object_key.into(),
        }
    }
}

impl std::fmt::Display for StorageLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.container, self.object_key)
    }
}

// ============================================================================
// Document classification
// ============================================================================

/// Document category selected at upload time.
///
/// Unknown categories round-trip through [`DocumentType::Other`] so a new
/// upload type never breaks event processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentType {
    CurrentLabs,
    InsuranceCard,
    PhotoId,
    MedicationList,
    Referral,
    Other(String),
}

impl DocumentType {
    /// Canonical string form, as stored in object tags and the database.
    pub fn as_str(&self) -> &str {
        match self {
            Self::CurrentLabs => "current_labs",
            Self::InsuranceCard => "insurance_card",
            Self::PhotoId => "photo_id",
            Self::MedicationList => "medication_list",
            Self::Referral => "referral",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for DocumentType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "current_labs" => Self::CurrentLabs,
            "insurance_card" => Self::InsuranceCard,
            "photo_id" => Self::PhotoId,
            "medication_list" => Self::MedicationList,
            "referral" => Self::Referral,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for DocumentType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<DocumentType> for String {
    fn from(d: DocumentType) -> Self {
        d.as_str().to_string()
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Review workflow
// ============================================================================

/// Review status of a staging record.
///
/// `PendingReview` is set only by the pipeline; the remaining states are set
/// only by the reviewer collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    PendingReview,
    Approved,
    Rejected,
    NeedsCorrection,
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PendingReview => write!(f, "pending_review"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
            Self::NeedsCorrection => write!(f, "needs_correction"),
        }
    }
}

/// Reviewer decision applied to a staging record.
///
/// `final_document_type` records a corrected classification; the original
/// `document_type` on the record is preserved for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDecision {
    pub status: ReviewStatus,
    pub reviewed_by: String,
    pub final_document_type: Option<DocumentType>,
    pub admin_notes: Option<String>,
}

// ============================================================================
// Extracted payload
// ============================================================================

/// One resolved field from the extraction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    /// Normalized value: leading numeric token, or raw text verbatim when no
    /// numeric token exists.
    pub value: String,
    /// Original answer text as returned by the service.
    pub raw_text: String,
    /// Confidence score (0-100), rounded to one decimal place.
    pub confidence: f32,
}

/// Field key → resolved field. `None` means the service found no answer or
/// its confidence fell below the low threshold: a "needs manual entry"
/// signal, not an error. BTreeMap keeps the serialized JSON stable.
pub type ExtractedFields = BTreeMap<String, Option<ExtractedField>>;

/// Result of the extraction dispatch step for one record.
#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    /// `None` when the document type is not extraction-eligible or the
    /// extraction call failed.
    pub fields: Option<ExtractedFields>,
    /// Normalized lab report date, lab-type documents only.
    pub lab_date: Option<NaiveDate>,
    /// Captured extraction-service failure, if any.
    pub error: Option<String>,
}

// ============================================================================
// Staging record
// ============================================================================

/// One reviewable record per processed upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingRecord {
    pub id: Uuid,
    pub patient_id: String,
    /// Back-reference to the originating upload record; NULL when the
    /// best-effort lookup failed.
    pub source_document_id: Option<Uuid>,
    /// Document type as selected at upload.
    pub document_type: DocumentType,
    /// Reviewer correction; initially unset.
    pub final_document_type: Option<DocumentType>,
    pub container: String,
    pub object_key: String,
    pub extracted_fields: Option<ExtractedFields>,
    pub lab_date: Option<NaiveDate>,
    pub extraction_error: Option<String>,
    pub status: ReviewStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new staging record. Status is always
/// `PendingReview`; id and timestamps are generated by the repository.
#[derive(Debug, Clone)]
pub struct NewStagingRecord {
    pub patient_id: String,
    pub source_document_id: Option<Uuid>,
    pub document_type: DocumentType,
    pub locator: StorageLocator,
    pub extracted_fields: Option<ExtractedFields>,
    pub lab_date: Option<NaiveDate>,
    pub extraction_error: Option<String>,
}

/// Outcome of an idempotent staging insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written.
    Inserted(Uuid),
    /// A row for this storage location already exists (event redelivery).
    Duplicate(Uuid),
}

impl InsertOutcome {
    pub fn staging_id(&self) -> Uuid {
        match self {
            Self::Inserted(id) | Self::Duplicate(id) => *id,
        }
    }
}

/// Upload record written by the upstream upload endpoint, used for
/// best-effort backward linkage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: Uuid,
    pub patient_id: String,
    pub container: String,
    pub object_key: String,
    pub document_type: DocumentType,
    pub uploaded_at: DateTime<Utc>,
}

// ============================================================================
// Metadata resolution
// ============================================================================

/// Where the record's identifiers were resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSource {
    Tags,
    Path,
}

/// Identifiers resolved for one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub patient_id: String,
    pub document_type: DocumentType,
    pub source: MetadataSource,
}

// ============================================================================
// Events and batch reporting
// ============================================================================

/// One object-created notification from the storage event source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectCreatedEvent {
    pub container: String,
    /// Object key as delivered: percent-encoded.
    pub object_key: String,
}

/// Batch of storage-change notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBatch {
    pub records: Vec<ObjectCreatedEvent>,
}

/// Terminal disposition of one record within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Disposition {
    /// A staging row was written.
    Staged { staging_id: Uuid },
    /// A staging row for this location already existed.
    Duplicate { staging_id: Uuid },
    /// Fatal per-record failure; the event source will redeliver.
    Failed { error: String },
    /// Not attempted before the batch deadline; the event source should
    /// redeliver only these.
    Unprocessed,
}

/// Per-record entry in the batch result list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub container: String,
    pub object_key: String,
    #[serde(flatten)]
    pub disposition: Disposition,
}

/// Aggregated result of one batch invocation: the only surface visible to
/// operational monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub staged: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub unprocessed: usize,
    pub outcomes: Vec<RecordOutcome>,
}

impl BatchReport {
    /// Build a report from per-record outcomes, tallying dispositions.
    pub fn from_outcomes(outcomes: Vec<RecordOutcome>) -> Self {
        let mut staged = 0;
        let mut duplicates = 0;
        let mut failed = 0;
        let mut unprocessed = 0;
        for outcome in &outcomes {
            match outcome.disposition {
                Disposition::Staged { .. } => staged += 1,
                Disposition::Duplicate { .. } => duplicates += 1,
                Disposition::Failed { .. } => failed += 1,
                Disposition::Unprocessed => unprocessed += 1,
            }
        }
        Self {
            total: outcomes.len(),
            staged,
            duplicates,
            failed,
            unprocessed,
            outcomes,
        }
    }
}

// ============================================================================
// Extraction service wire model
// ============================================================================

/// A named natural-language query sent to the extraction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldQuery {
    /// Canonical field key, sent as the query alias so answers map back.
    #[serde(rename = "alias")]
    pub key: &'static str,
    /// Natural-language question eliciting one structured field.
    #[serde(rename = "text")]
    pub query: &'static str,
}

/// Block type in the extraction service response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockKind {
    Query,
    QueryResult,
    Page,
    Line,
    Word,
    #[serde(other)]
    Unknown,
}

/// Relationship type between blocks. Only `Answer` is followed by the
/// parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipKind {
    Answer,
    Child,
    #[serde(other)]
    Unknown,
}

/// Typed edge from one block to a list of target block ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    #[serde(default)]
    pub ids: Vec<String>,
}

/// One block of the flat response list.
///
/// QUERY blocks carry `alias` and ANSWER relationships; QUERY_RESULT blocks
/// carry `text` and a 0-100 `confidence` float.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "block_type")]
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
}

impl Block {
    /// Convenience constructor for a QUERY block.
    pub fn query(id: impl Into<String>, alias: impl Into<String>, answer_ids: Vec<String>) -> Self {
        Self {
            id: id.into(),
            kind: BlockKind::Query,
            alias: Some(alias.into()),
            text: None,
            confidence: None,
            relationships: vec![Relationship {
                kind: RelationshipKind::Answer,
                ids: answer_ids,
            }],
        }
    }

    /// Convenience constructor for a QUERY_RESULT block.
    pub fn query_result(id: impl Into<String>, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            id: id.into(),
            kind: BlockKind::QueryResult,
            alias: None,
            text: Some(text.into()),
            confidence: Some(confidence),
            relationships: Vec::new(),
        }
    }
}

/// Request payload for the extraction service `/v1/analyze` endpoint.
#[derive(Debug, Serialize)]
pub struct AnalyzeRequest<'a> {
    /// Raw document bytes, base64-encoded.
    pub document: String,
    pub queries: &'a [FieldQuery],
}

/// Response payload from the extraction service.
#[derive(Debug, Deserialize)]
pub struct AnalyzeResponse {
    pub blocks: Vec<Block>,
}

/// Convert extracted fields into the JSONB column representation.
pub fn fields_to_json(fields: &ExtractedFields) -> JsonValue {
    serde_json::to_value(fields).unwrap_or(JsonValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_round_trip() {
        for s in [
            "current_labs",
            "insurance_card",
            "photo_id",
            "medication_list",
            "referral",
        ] {
            let dt = DocumentType::from(s);
            assert_eq!(dt.as_str(), s);
            assert!(!matches!(dt, DocumentType::Other(_)));
        }
    }

    #[test]
    fn test_document_type_unknown_preserved() {
        let dt = DocumentType::from("discharge_summary");
        assert_eq!(dt, DocumentType::Other("discharge_summary".to_string()));
        assert_eq!(dt.as_str(), "discharge_summary");
    }

    #[test]
    fn test_document_type_serde_as_string() {
        let json = serde_json::to_string(&DocumentType::CurrentLabs).unwrap();
        assert_eq!(json, "\"current_labs\"");
        let back: DocumentType = serde_json::from_str("\"insurance_card\"").unwrap();
        assert_eq!(back, DocumentType::InsuranceCard);
    }

    #[test]
    fn test_review_status_default_is_pending() {
        assert_eq!(ReviewStatus::default(), ReviewStatus::PendingReview);
    }

    #[test]
    fn test_review_status_display() {
        assert_eq!(ReviewStatus::PendingReview.to_string(), "pending_review");
        assert_eq!(ReviewStatus::NeedsCorrection.to_string(), "needs_correction");
    }

    #[test]
    fn test_storage_locator_display() {
        let loc = StorageLocator::new("uploads", "patients/P1/doc.pdf");
        assert_eq!(loc.to_string(), "uploads/patients/P1/doc.pdf");
    }

    #[test]
    fn test_insert_outcome_staging_id() {
        let id = Uuid::new_v4();
        assert_eq!(InsertOutcome::Inserted(id).staging_id(), id);
        assert_eq!(InsertOutcome::Duplicate(id).staging_id(), id);
    }

    #[test]
    fn test_batch_report_tallies() {
        let id = Uuid::new_v4();
        let outcomes = vec![
            RecordOutcome {
                container: "uploads".into(),
                object_key: "a".into(),
                disposition: Disposition::Staged { staging_id: id },
            },
            RecordOutcome {
                container: "uploads".into(),
                object_key: "b".into(),
                disposition: Disposition::Failed {
                    error: "boom".into(),
                },
            },
            RecordOutcome {
                container: "uploads".into(),
                object_key: "c".into(),
                disposition: Disposition::Unprocessed,
            },
            RecordOutcome {
                container: "uploads".into(),
                object_key: "d".into(),
                disposition: Disposition::Duplicate { staging_id: id },
            },
        ];
        let report = BatchReport::from_outcomes(outcomes);
        assert_eq!(report.total, 4);
        assert_eq!(report.staged, 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.unprocessed, 1);
    }

    #[test]
    fn test_disposition_serde_tagging() {
        let outcome = RecordOutcome {
            container: "uploads".into(),
            object_key: "a".into(),
            disposition: Disposition::Unprocessed,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "unprocessed");
        assert_eq!(json["container"], "uploads");
    }

    #[test]
    fn test_block_kind_deserialize_wire_names() {
        let kind: BlockKind = serde_json::from_str("\"QUERY_RESULT\"").unwrap();
        assert_eq!(kind, BlockKind::QueryResult);
        let unknown: BlockKind = serde_json::from_str("\"SIGNATURE\"").unwrap();
        assert_eq!(unknown, BlockKind::Unknown);
    }

    #[test]
    fn test_block_deserialize_minimal() {
        let json = r#"{"id": "b1", "block_type": "PAGE"}"#;
        let block: Block = serde_json::from_str(json).unwrap();
        assert_eq!(block.kind, BlockKind::Page);
        assert!(block.alias.is_none());
        assert!(block.relationships.is_empty());
    }

    #[test]
    fn test_block_deserialize_query_with_answer() {
        let json = r#"{
            "id": "q1",
            "block_type": "QUERY",
            "alias": "potassium",
            "relationships": [{"type": "ANSWER", "ids": ["r1"]}]
        }"#;
        let block: Block = serde_json::from_str(json).unwrap();
        assert_eq!(block.alias.as_deref(), Some("potassium"));
        assert_eq!(block.relationships[0].kind, RelationshipKind::Answer);
        assert_eq!(block.relationships[0].ids, vec!["r1"]);
    }

    #[test]
    fn test_extracted_fields_json_shape() {
        let mut fields = ExtractedFields::new();
        fields.insert(
            "potassium".to_string(),
            Some(ExtractedField {
                value: "4.5".to_string(),
                raw_text: "4.5 mg/dL".to_string(),
                confidence: 92.0,
            }),
        );
        fields.insert("bun".to_string(), None);

        let json = fields_to_json(&fields);
        assert_eq!(json["potassium"]["value"], "4.5");
        assert_eq!(json["potassium"]["raw_text"], "4.5 mg/dL");
        assert!(json["bun"].is_null());
    }
}
