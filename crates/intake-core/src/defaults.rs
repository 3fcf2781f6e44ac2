//! Centralized default constants for the intake pipeline.
//!
//! **This module is the single source of truth** for all shared default values.
//! All crates and the API binary should reference these constants instead of
//! defining their own magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// CONFIDENCE THRESHOLDS
// =============================================================================

/// Low confidence threshold (0-100 scale). Extracted values below this are
/// discarded and the field is staged as null for manual entry.
pub const CONFIDENCE_LOW: f32 = 50.0;

/// Medium confidence threshold (0-100 scale). Values between low and medium
/// are kept but carry their score so reviewers can prioritize verification.
pub const CONFIDENCE_MEDIUM: f32 = 70.0;

/// Decimal places kept when rounding reported confidence scores.
pub const CONFIDENCE_PRECISION: u32 = 1;

// =============================================================================
// TIMEOUTS
// =============================================================================

/// Per-record processing timeout in seconds (fetch + extract + persist).
pub const RECORD_TIMEOUT_SECS: u64 = 60;

/// Overall batch deadline in seconds. Records not started before the
/// deadline are reported as unprocessed rather than silently dropped.
pub const BATCH_DEADLINE_SECS: u64 = 240;

/// HTTP timeout for a single extraction service call in seconds.
pub const EXTRACT_TIMEOUT_SECS: u64 = 45;

/// HTTP timeout for a single object store call in seconds.
pub const STORE_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// OBJECT METADATA
// =============================================================================

/// Object tag key carrying the patient identifier.
pub const TAG_PATIENT_ID: &str = "patient-id";

/// Object tag key carrying the document type.
pub const TAG_DOCUMENT_TYPE: &str = "document-type";

/// First path segment of the fallback key layout
/// (`patients/{patient_id}/documents/{document_type}/{group_id}/{filename}`).
pub const PATH_SEGMENT_PATIENTS: &str = "patients";

/// Third path segment of the fallback key layout.
pub const PATH_SEGMENT_DOCUMENTS: &str = "documents";

/// Number of segments in a well-formed fallback key.
pub const PATH_SEGMENT_COUNT: usize = 6;

// =============================================================================
// DOCUMENT LIMITS
// =============================================================================

/// Maximum document size in bytes sent to the extraction service (10 MB).
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 8080;

/// Default extraction service base URL.
pub const EXTRACT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable for the extraction service base URL.
pub const ENV_EXTRACT_BASE_URL: &str = "EXTRACT_BASE_URL";

/// Environment variable for the object storage gateway base URL.
pub const ENV_STORAGE_BASE_URL: &str = "STORAGE_BASE_URL";

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for the pending-review listing.
pub const PAGE_LIMIT: i64 = 50;

/// Default page offset.
pub const PAGE_OFFSET: i64 = 0;
