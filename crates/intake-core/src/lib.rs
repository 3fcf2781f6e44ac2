//! # intake-core
//!
//! Core types, traits, and abstractions for the document-intake pipeline.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other intake crates depend on: the staging-record data model, the
//! error taxonomy, configuration, the structured-logging schema, and the
//! service seams (object store, extraction backend, repositories).

pub mod config;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
