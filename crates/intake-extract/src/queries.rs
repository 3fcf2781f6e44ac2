//! The field query catalog sent with every lab extraction request.
//!
//! Keys are the canonical staging field names; the alias on the wire is the
//! key, so answers map back without positional coupling.

use intake_core::FieldQuery;

/// Field key carrying the lab report date. Parsed into a date column
/// instead of the fields map.
pub const LAB_DATE_KEY: &str = "lab_date";

/// Queries issued for every extraction-eligible document.
pub const FIELD_QUERIES: &[FieldQuery] = &[
    FieldQuery {
        key: LAB_DATE_KEY,
        query: "What is the collection or report date of the lab results?",
    },
    FieldQuery {
        key: "potassium",
        query: "What is the potassium level?",
    },
    FieldQuery {
        key: "sodium",
        query: "What is the sodium level?",
    },
    FieldQuery {
        key: "creatinine",
        query: "What is the creatinine level?",
    },
    FieldQuery {
        key: "bun",
        query: "What is the blood urea nitrogen (BUN) level?",
    },
    FieldQuery {
        key: "egfr",
        query: "What is the estimated glomerular filtration rate (eGFR)?",
    },
    FieldQuery {
        key: "glucose",
        query: "What is the glucose level?",
    },
    FieldQuery {
        key: "calcium",
        query: "What is the calcium level?",
    },
    FieldQuery {
        key: "phosphorus",
        query: "What is the phosphorus level?",
    },
    FieldQuery {
        key: "albumin",
        query: "What is the albumin level?",
    },
    FieldQuery {
        key: "hemoglobin",
        query: "What is the hemoglobin level?",
    },
    FieldQuery {
        key: "hematocrit",
        query: "What is the hematocrit percentage?",
    },
    FieldQuery {
        key: "wbc",
        query: "What is the white blood cell (WBC) count?",
    },
    FieldQuery {
        key: "platelet_count",
        query: "What is the platelet count?",
    },
    FieldQuery {
        key: "alt",
        query: "What is the alanine aminotransferase (ALT) level?",
    },
    FieldQuery {
        key: "ast",
        query: "What is the aspartate aminotransferase (AST) level?",
    },
    FieldQuery {
        key: "total_bilirubin",
        query: "What is the total bilirubin level?",
    },
    FieldQuery {
        key: "inr",
        query: "What is the INR value?",
    },
];
