//! # intake-extract
//!
//! Extraction service client and answer parsing for the intake pipeline.
//!
//! This crate provides:
//! - The field query catalog sent with every lab extraction request
//! - The HTTP client for the extraction service
//! - Block-list answer resolution with confidence gating
//! - Answer text normalization (numeric tokens, lab dates)
//! - A mock backend for deterministic tests

pub mod client;
pub mod mock;
pub mod normalize;
pub mod parser;
pub mod queries;

// Re-export core types
pub use intake_core::*;

pub use client::HttpExtractionBackend;
pub use mock::MockExtractionBackend;
pub use normalize::{normalize_value, parse_lab_date, round_confidence};
pub use parser::{parse_blocks, resolve_answer};
pub use queries::{FIELD_QUERIES, LAB_DATE_KEY};
