//! Block-list answer resolution.
//!
//! The extraction service returns a flat block list. Each QUERY block
//! carries the alias it was asked under and an ANSWER relationship pointing
//! at QUERY_RESULT blocks. Resolution walks alias → ANSWER ids → result
//! block; anything that fails along the way resolves to "no answer", which
//! stages the field as null for manual entry.

use chrono::NaiveDate;
use tracing::{debug, trace};

use intake_core::{
    Block, BlockKind, ExtractedField, ExtractedFields, ExtractionOutcome, FieldQuery,
    PipelineConfig, RelationshipKind,
};

use crate::normalize::{normalize_value, parse_lab_date, round_confidence};
use crate::queries::LAB_DATE_KEY;

/// Follow one query alias to its answering QUERY_RESULT block.
///
/// Returns `None` when the alias has no QUERY block, the QUERY block has no
/// ANSWER relationship, or no referenced id resolves to a QUERY_RESULT.
pub fn resolve_answer<'a>(blocks: &'a [Block], alias: &str) -> Option<&'a Block> {
    let query = blocks
        .iter()
        .find(|b| b.kind == BlockKind::Query && b.alias.as_deref() == Some(alias))?;

    let answer_ids = query
        .relationships
        .iter()
        .find(|r| r.kind == RelationshipKind::Answer)
        .map(|r| r.ids.as_slice())?;

    answer_ids.iter().find_map(|id| {
        blocks
            .iter()
            .find(|b| b.kind == BlockKind::QueryResult && &b.id == id)
    })
}

/// Resolve a full block list into staged fields and the lab date.
///
/// Every query key appears in the output map; `None` marks fields needing
/// manual entry (no answer, or confidence below the low threshold).
pub fn parse_blocks(
    blocks: &[Block],
    queries: &[FieldQuery],
    config: &PipelineConfig,
) -> ExtractionOutcome {
    let mut fields = ExtractedFields::new();
    let mut lab_date: Option<NaiveDate> = None;

    for query in queries {
        let resolved = resolve_answer(blocks, query.key).and_then(|block| {
            let text = block.text.as_deref()?;
            let confidence = round_confidence(block.confidence?);
            Some((text, confidence))
        });

        let accepted = match resolved {
            Some((text, confidence)) if confidence >= config.confidence_low => {
                if confidence < config.confidence_medium {
                    debug!(
                        subsystem = "extract",
                        component = "parser",
                        field_key = query.key,
                        confidence,
                        "Answer below medium confidence, flagged for closer review"
                    );
                }
                Some((text, confidence))
            }
            Some((_, confidence)) => {
                trace!(
                    subsystem = "extract",
                    component = "parser",
                    field_key = query.key,
                    confidence,
                    "Answer below low confidence, staging as null"
                );
                None
            }
            None => None,
        };

        if query.key == LAB_DATE_KEY {
            lab_date = accepted.and_then(|(text, _)| parse_lab_date(text));
            continue;
        }

        let field = accepted.map(|(text, confidence)| ExtractedField {
            value: normalize_value(text),
            raw_text: text.to_string(),
            confidence,
        });
        fields.insert(query.key.to_string(), field);
    }

    ExtractionOutcome {
        fields: Some(fields),
        lab_date,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::FIELD_QUERIES;
    use intake_core::Block;

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    #[test]
    fn test_resolve_answer_follows_relationship() {
        let blocks = vec![
            Block::query("q1", "potassium", vec!["r1".to_string()]),
            Block::query_result("r1", "4.5 mg/dL", 92.3),
        ];
        let answer = resolve_answer(&blocks, "potassium").unwrap();
        assert_eq!(answer.text.as_deref(), Some("4.5 mg/dL"));
    }

    #[test]
    fn test_resolve_answer_missing_alias() {
        let blocks = vec![Block::query_result("r1", "4.5", 92.0)];
        assert!(resolve_answer(&blocks, "potassium").is_none());
    }

    #[test]
    fn test_resolve_answer_dangling_id() {
        let blocks = vec![Block::query("q1", "potassium", vec!["missing".to_string()])];
        assert!(resolve_answer(&blocks, "potassium").is_none());
    }

    #[test]
    fn test_resolve_answer_no_answer_relationship() {
        let mut query = Block::query("q1", "potassium", vec![]);
        query.relationships.clear();
        let blocks = vec![query, Block::query_result("r1", "4.5", 92.0)];
        assert!(resolve_answer(&blocks, "potassium").is_none());
    }

    #[test]
    fn test_parse_blocks_happy_path() {
        let blocks = vec![
            Block::query("q1", "potassium", vec!["r1".to_string()]),
            Block::query_result("r1", "4.5 mg/dL", 92.34),
            Block::query("q2", "lab_date", vec!["r2".to_string()]),
            Block::query_result("r2", "03/15/2025", 88.0),
        ];
        let outcome = parse_blocks(&blocks, FIELD_QUERIES, &config());
        let fields = outcome.fields.unwrap();

        let potassium = fields["potassium"].as_ref().unwrap();
        assert_eq!(potassium.value, "4.5");
        assert_eq!(potassium.raw_text, "4.5 mg/dL");
        assert_eq!(potassium.confidence, 92.3);

        assert_eq!(
            outcome.lab_date,
            NaiveDate::from_ymd_opt(2025, 3, 15)
        );
    }

    #[test]
    fn test_parse_blocks_every_key_present() {
        let outcome = parse_blocks(&[], FIELD_QUERIES, &config());
        let fields = outcome.fields.unwrap();
        // lab_date lives in its own column, everything else in the map
        assert_eq!(fields.len(), FIELD_QUERIES.len() - 1);
        assert!(fields.values().all(Option::is_none));
        assert!(outcome.lab_date.is_none());
    }

    #[test]
    fn test_parse_blocks_below_low_is_null() {
        let blocks = vec![
            Block::query("q1", "sodium", vec!["r1".to_string()]),
            Block::query_result("r1", "139", 42.0),
        ];
        let outcome = parse_blocks(&blocks, FIELD_QUERIES, &config());
        assert!(outcome.fields.unwrap()["sodium"].is_none());
    }

    #[test]
    fn test_parse_blocks_between_low_and_medium_kept() {
        let blocks = vec![
            Block::query("q1", "glucose", vec!["r1".to_string()]),
            Block::query_result("r1", "101 mg/dL", 63.0),
        ];
        let outcome = parse_blocks(&blocks, FIELD_QUERIES, &config());
        let fields = outcome.fields.unwrap();
        let glucose = fields["glucose"].as_ref().unwrap();
        assert_eq!(glucose.value, "101");
        assert_eq!(glucose.confidence, 63.0);
    }

    #[test]
    fn test_parse_blocks_qualitative_kept_verbatim() {
        let blocks = vec![
            Block::query("q1", "inr", vec!["r1".to_string()]),
            Block::query_result("r1", "Not detected", 81.0),
        ];
        let outcome = parse_blocks(&blocks, FIELD_QUERIES, &config());
        let fields = outcome.fields.unwrap();
        assert_eq!(fields["inr"].as_ref().unwrap().value, "Not detected");
    }

    #[test]
    fn test_parse_blocks_unparseable_lab_date_is_none() {
        let blocks = vec![
            Block::query("q1", "lab_date", vec!["r1".to_string()]),
            Block::query_result("r1", "around mid-March", 95.0),
        ];
        let outcome = parse_blocks(&blocks, FIELD_QUERIES, &config());
        assert!(outcome.lab_date.is_none());
    }

    #[test]
    fn test_parse_blocks_low_confidence_lab_date_discarded() {
        let blocks = vec![
            Block::query("q1", "lab_date", vec!["r1".to_string()]),
            Block::query_result("r1", "03/15/2025", 20.0),
        ];
        let outcome = parse_blocks(&blocks, FIELD_QUERIES, &config());
        assert!(outcome.lab_date.is_none());
    }
}
