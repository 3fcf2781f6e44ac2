//! # intake-storage
//!
//! Object store backends for the intake pipeline.
//!
//! This crate provides the two [`ObjectStore`](intake_core::ObjectStore)
//! implementations:
//! - [`FilesystemStore`]: local directory layout for development and tests
//! - [`HttpObjectStore`]: JSON storage gateway client for production
//!
//! Both expose the same two reads the pipeline needs: object bytes and the
//! object's tag set.

pub mod filesystem;
pub mod http;

// Re-export core types
pub use intake_core::*;

pub use filesystem::FilesystemStore;
pub use http::HttpObjectStore;
