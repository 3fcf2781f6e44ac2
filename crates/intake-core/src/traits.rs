//! Core traits for intake pipeline abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// REPOSITORY TRAITS
// =============================================================================

/// Repository for staging record persistence and review.
#[async_trait]
pub trait StagingRepository: Send + Sync {
    /// Insert a staging record.
    ///
    /// Insertion is idempotent on `(container, object_key)`: redelivery of
    /// an already-staged object returns [`InsertOutcome::Duplicate`] with the
    /// existing record's id instead of creating a second row.
    async fn insert(&self, record: NewStagingRecord) -> Result<InsertOutcome>;

    /// Fetch a full staging record by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<StagingRecord>;

    /// List records awaiting review, newest first.
    async fn list_pending(&self, limit: i64, offset: i64) -> Result<Vec<StagingRecord>>;

    /// Apply a reviewer's decision and return the updated record.
    async fn record_review(&self, id: Uuid, decision: ReviewDecision) -> Result<StagingRecord>;
}

/// Repository for locating source document rows by storage coordinates.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Find the document row matching a storage location, if one exists.
    async fn find_by_location(&self, locator: &StorageLocator) -> Result<Option<SourceDocument>>;
}

// =============================================================================
// SERVICE TRAITS
// =============================================================================

/// Backend for reading uploaded objects and their tags.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the raw bytes of an object.
    async fn fetch(&self, locator: &StorageLocator) -> Result<Vec<u8>>;

    /// Fetch the tag set of an object. Missing tags are an empty map, not
    /// an error.
    async fn tags(&self, locator: &StorageLocator) -> Result<HashMap<String, String>>;
}

/// Backend for document field extraction.
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    /// Run the given field queries against a document and return the raw
    /// block list.
    async fn analyze(&self, document: &[u8], queries: &[FieldQuery]) -> Result<Vec<Block>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traits_are_object_safe() {
        fn _staging(_: &dyn StagingRepository) {}
        fn _documents(_: &dyn DocumentRepository) {}
        fn _store(_: &dyn ObjectStore) {}
        fn _extraction(_: &dyn ExtractionBackend) {}
    }
}
