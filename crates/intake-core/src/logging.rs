//! Structured logging schema and field name constants for the intake pipeline.
//!
//! All crates use these constants for consistent structured logging fields.
//! This ensures log aggregation tools (Loki, Elasticsearch) can query by
//! standardized field names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, record-level failure, fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), batch/record completions |
//! | DEBUG | Decision points, metadata resolution, eligibility choices |
//! | TRACE | Per-field iteration, high-volume data (blocks, query results) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across request → record → sub-calls.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "pipeline", "extract", "storage", "db"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "dispatcher", "metadata", "analyze_client", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "process_batch", "process_record", "analyze", "insert"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Storage container holding the object.
pub const CONTAINER: &str = "container";

/// Object key within the container.
pub const OBJECT_KEY: &str = "object_key";

/// Patient UUID the document belongs to.
pub const PATIENT_ID: &str = "patient_id";

/// Staging record UUID.
pub const STAGING_ID: &str = "staging_id";

/// Resolved document type label.
pub const DOCUMENT_TYPE: &str = "document_type";

/// Field key being extracted (e.g. "potassium").
pub const FIELD_KEY: &str = "field_key";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records in a batch.
pub const RECORD_COUNT: &str = "record_count";

/// Number of fields populated by extraction.
pub const FIELD_COUNT: &str = "field_count";

/// Number of blocks returned by the extraction service.
pub const BLOCK_COUNT: &str = "block_count";

/// Confidence score of an extracted answer (0-100).
pub const CONFIDENCE: &str = "confidence";

/// Byte length of a fetched document.
pub const DOC_BYTES: &str = "doc_bytes";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Database table or entity affected.
pub const DB_TABLE: &str = "db_table";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
