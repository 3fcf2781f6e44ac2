//! Metadata resolution: object tags first, path convention second.

use std::collections::HashMap;

use intake_core::{
    defaults, DocumentMetadata, DocumentType, Error, MetadataSource, PipelineConfig, Result,
};

/// Decode an object key as delivered by the event source.
///
/// Event notifications percent-encode keys and encode spaces as `+`.
pub fn decode_key(raw: &str) -> Result<String> {
    let plus_decoded = raw.replace('+', " ");
    urlencoding::decode(&plus_decoded)
        .map(|s| s.into_owned())
        .map_err(|e| Error::InvalidInput(format!("undecodable object key {}: {}", raw, e)))
}

/// Parse identifiers from the conventional key layout
/// `patients/{patient_id}/documents/{document_type}/{group_id}/{filename}`.
pub fn parse_path(key: &str) -> Option<(String, DocumentType)> {
    let segments: Vec<&str> = key.split('/').collect();
    if segments.len() != defaults::PATH_SEGMENT_COUNT {
        return None;
    }
    if segments[0] != defaults::PATH_SEGMENT_PATIENTS
        || segments[2] != defaults::PATH_SEGMENT_DOCUMENTS
    {
        return None;
    }
    let patient_id = segments[1];
    let document_type = segments[3];
    if patient_id.is_empty() || document_type.is_empty() {
        return None;
    }
    Some((patient_id.to_string(), DocumentType::from(document_type)))
}

/// Resolve patient id and document type for one upload.
///
/// Tags win when both expected keys are present; otherwise the path
/// convention is tried. A record that yields identifiers from neither
/// source fails with a metadata resolution error, fatal for that record
/// only.
pub fn resolve_metadata(
    tags: &HashMap<String, String>,
    decoded_key: &str,
    config: &PipelineConfig,
) -> Result<DocumentMetadata> {
    let tag_patient = tags
        .get(&config.tag_patient_id)
        .map(String::as_str)
        .filter(|s| !s.is_empty());
    let tag_type = tags
        .get(&config.tag_document_type)
        .map(String::as_str)
        .filter(|s| !s.is_empty());

    if let (Some(patient_id), Some(document_type)) = (tag_patient, tag_type) {
        return Ok(DocumentMetadata {
            patient_id: patient_id.to_string(),
            document_type: DocumentType::from(document_type),
            source: MetadataSource::Tags,
        });
    }

    if let Some((patient_id, document_type)) = parse_path(decoded_key) {
        return Ok(DocumentMetadata {
            patient_id,
            document_type,
            source: MetadataSource::Path,
        });
    }

    Err(Error::MetadataResolution(format!(
        "no patient id or document type in tags or path for key {}",
        decoded_key
    )))
}
