//! Runtime configuration for the intake pipeline.
//!
//! Thresholds, timeouts, tag keys, and the extraction eligibility list are
//! read from `INTAKE_*` environment variables with fallback to the defaults
//! in [`crate::defaults`]. Invalid values log a warning and fall back rather
//! than failing startup.

use std::time::Duration;

use crate::defaults;
use crate::models::DocumentType;

/// Configuration for batch processing, extraction gating, and metadata
/// resolution.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Confidence floor (0-100). Answers below this are staged as null.
    pub confidence_low: f32,
    /// Advisory threshold (0-100). Answers between low and medium are kept
    /// but flagged for closer review.
    pub confidence_medium: f32,
    /// Time limit for a single record (fetch + extract + persist).
    pub record_timeout: Duration,
    /// Overall deadline for a batch; records not started in time are
    /// reported as unprocessed.
    pub batch_deadline: Duration,
    /// HTTP timeout for one extraction service call.
    pub extract_timeout: Duration,
    /// HTTP timeout for one object store call.
    pub store_timeout: Duration,
    /// Object tag key carrying the patient identifier.
    pub tag_patient_id: String,
    /// Object tag key carrying the document type.
    pub tag_document_type: String,
    /// Document types that go through field extraction. Everything else is
    /// staged directly.
    pub eligible_types: Vec<DocumentType>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_low: defaults::CONFIDENCE_LOW,
            confidence_medium: defaults::CONFIDENCE_MEDIUM,
            record_timeout: Duration::from_secs(defaults::RECORD_TIMEOUT_SECS),
            batch_deadline: Duration::from_secs(defaults::BATCH_DEADLINE_SECS),
            extract_timeout: Duration::from_secs(defaults::EXTRACT_TIMEOUT_SECS),
            store_timeout: Duration::from_secs(defaults::STORE_TIMEOUT_SECS),
            tag_patient_id: defaults::TAG_PATIENT_ID.to_string(),
            tag_document_type: defaults::TAG_DOCUMENT_TYPE.to_string(),
            eligible_types: vec![DocumentType::CurrentLabs],
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables with fallback to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("INTAKE_CONFIDENCE_LOW") {
            if let Ok(t) = val.parse::<f32>() {
                config.confidence_low = t.clamp(0.0, 100.0);
            } else {
                tracing::warn!(value = %val, "Invalid INTAKE_CONFIDENCE_LOW, using default");
            }
        }

        if let Ok(val) = std::env::var("INTAKE_CONFIDENCE_MEDIUM") {
            if let Ok(t) = val.parse::<f32>() {
                config.confidence_medium = t.clamp(0.0, 100.0);
            } else {
                tracing::warn!(value = %val, "Invalid INTAKE_CONFIDENCE_MEDIUM, using default");
            }
        }

        if config.confidence_medium < config.confidence_low {
            tracing::warn!(
                low = config.confidence_low,
                medium = config.confidence_medium,
                "Medium threshold below low threshold, raising to match"
            );
            config.confidence_medium = config.confidence_low;
        }

        if let Some(secs) = env_secs("INTAKE_RECORD_TIMEOUT_SECS", 1, 600) {
            config.record_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_secs("INTAKE_BATCH_DEADLINE_SECS", 1, 3600) {
            config.batch_deadline = Duration::from_secs(secs);
        }
        if let Some(secs) = env_secs("INTAKE_EXTRACT_TIMEOUT_SECS", 1, 600) {
            config.extract_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_secs("INTAKE_STORE_TIMEOUT_SECS", 1, 600) {
            config.store_timeout = Duration::from_secs(secs);
        }

        if let Ok(val) = std::env::var("INTAKE_TAG_PATIENT_ID") {
            if !val.trim().is_empty() {
                config.tag_patient_id = val;
            }
        }
        if let Ok(val) = std::env::var("INTAKE_TAG_DOCUMENT_TYPE") {
            if !val.trim().is_empty() {
                config.tag_document_type = val;
            }
        }

        if let Ok(val) = std::env::var("INTAKE_ELIGIBLE_TYPES") {
            let types: Vec<DocumentType> = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(DocumentType::from)
                .collect();
            if types.is_empty() {
                tracing::warn!(value = %val, "Empty INTAKE_ELIGIBLE_TYPES, using default");
            } else {
                config.eligible_types = types;
            }
        }

        config
    }

    /// Whether documents of this type go through field extraction.
    pub fn is_eligible(&self, document_type: &DocumentType) -> bool {
        self.eligible_types.contains(document_type)
    }
}

fn env_secs(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    match val.parse::<u64>() {
        Ok(secs) => Some(secs.clamp(min, max)),
        Err(_) => {
            tracing::warn!(value = %val, "Invalid {name}, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert!((config.confidence_low - 50.0).abs() < f32::EPSILON);
        assert!((config.confidence_medium - 70.0).abs() < f32::EPSILON);
        assert_eq!(config.record_timeout, Duration::from_secs(60));
        assert_eq!(config.batch_deadline, Duration::from_secs(240));
        assert_eq!(config.extract_timeout, Duration::from_secs(45));
        assert_eq!(config.store_timeout, Duration::from_secs(30));
        assert_eq!(config.tag_patient_id, "patient-id");
        assert_eq!(config.tag_document_type, "document-type");
        assert_eq!(config.eligible_types, vec![DocumentType::CurrentLabs]);
    }

    #[test]
    fn test_only_current_labs_eligible_by_default() {
        let config = PipelineConfig::default();
        assert!(config.is_eligible(&DocumentType::CurrentLabs));
        assert!(!config.is_eligible(&DocumentType::InsuranceCard));
        assert!(!config.is_eligible(&DocumentType::PhotoId));
        assert!(!config.is_eligible(&DocumentType::MedicationList));
        assert!(!config.is_eligible(&DocumentType::Referral));
        assert!(!config.is_eligible(&DocumentType::Other("unknown".to_string())));
    }

    #[test]
    fn test_is_eligible_with_custom_list() {
        let config = PipelineConfig {
            eligible_types: vec![DocumentType::CurrentLabs, DocumentType::MedicationList],
            ..PipelineConfig::default()
        };
        assert!(config.is_eligible(&DocumentType::CurrentLabs));
        assert!(config.is_eligible(&DocumentType::MedicationList));
        assert!(!config.is_eligible(&DocumentType::Referral));
    }
}
