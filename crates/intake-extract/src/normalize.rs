//! Answer text normalization.
//!
//! Lab answers arrive as free text ("4.5 mg/dL", "Negative", "03/15/2025").
//! Numeric results keep only the leading numeric token; qualitative results
//! are kept verbatim so reviewers see what the document said.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(-?\d+(?:\.\d+)?)").expect("leading numeric regex"));

/// Date formats accepted for lab report dates, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y", "%m-%d-%Y", "%Y-%m-%d", "%m/%d/%y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y",
];

/// Extract the leading numeric token from an answer, or return the trimmed
/// answer verbatim when it does not start with a number.
pub fn normalize_value(raw: &str) -> String {
    match LEADING_NUMERIC.captures(raw) {
        Some(caps) => caps[1].to_string(),
        None => raw.trim().to_string(),
    }
}

/// Parse a lab report date from free text. Unparseable dates are `None`,
/// never an error: the reviewer supplies the date manually.
pub fn parse_lab_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Round a 0-100 confidence score to one decimal place.
pub fn round_confidence(confidence: f32) -> f32 {
    (confidence * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_units() {
        assert_eq!(normalize_value("4.5 mg/dL"), "4.5");
        assert_eq!(normalize_value("140 mmol/L"), "140");
        assert_eq!(normalize_value("  3.2  g/dL "), "3.2");
    }

    #[test]
    fn test_normalize_keeps_qualitative_verbatim() {
        assert_eq!(normalize_value("Negative"), "Negative");
        assert_eq!(normalize_value(" Trace protein "), "Trace protein");
        assert_eq!(normalize_value(">60 mL/min"), ">60 mL/min");
    }

    #[test]
    fn test_normalize_handles_negative_and_integer() {
        assert_eq!(normalize_value("-2.5 SD"), "-2.5");
        assert_eq!(normalize_value("98"), "98");
    }

    #[test]
    fn test_parse_lab_date_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert_eq!(parse_lab_date("03/15/2025"), Some(expected));
        assert_eq!(parse_lab_date("03-15-2025"), Some(expected));
        assert_eq!(parse_lab_date("2025-03-15"), Some(expected));
        assert_eq!(parse_lab_date("03/15/25"), Some(expected));
        assert_eq!(parse_lab_date("March 15, 2025"), Some(expected));
        assert_eq!(parse_lab_date("Mar 15, 2025"), Some(expected));
        assert_eq!(parse_lab_date("15 March 2025"), Some(expected));
    }

    #[test]
    fn test_parse_lab_date_garbage_is_none() {
        assert_eq!(parse_lab_date("sometime last week"), None);
        assert_eq!(parse_lab_date(""), None);
        assert_eq!(parse_lab_date("13/45/2025"), None);
    }

    #[test]
    fn test_round_confidence_one_decimal() {
        assert_eq!(round_confidence(87.6543), 87.7);
        assert_eq!(round_confidence(50.04), 50.0);
        assert_eq!(round_confidence(100.0), 100.0);
        assert_eq!(round_confidence(0.0), 0.0);
    }
}
