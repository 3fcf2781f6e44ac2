//! Filesystem object store for development and tests.
//!
//! Layout: `{base_path}/{container}/{object_key}` for object bytes, with an
//! optional `{object_key}.tags.json` sidecar holding the tag map.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use intake_core::{Error, ObjectStore, Result, StorageLocator};

/// Suffix appended to an object key to form its tag sidecar path.
const TAGS_SUFFIX: &str = ".tags.json";

/// Directory-backed object store.
pub struct FilesystemStore {
    base_path: PathBuf,
}

impl FilesystemStore {
    /// Create a new filesystem store rooted at the given directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn object_path(&self, locator: &StorageLocator) -> PathBuf {
        self.base_path
            .join(&locator.container)
            .join(&locator.object_key)
    }

    fn tags_path(&self, locator: &StorageLocator) -> PathBuf {
        self.base_path
            .join(&locator.container)
            .join(format!("{}{}", locator.object_key, TAGS_SUFFIX))
    }

    /// Write an object, creating parent directories as needed.
    ///
    /// Atomic write: temp file + rename.
    pub async fn put_object(&self, locator: &StorageLocator, data: &[u8]) -> Result<()> {
        let full_path = self.object_path(locator);
        debug!(
            subsystem = "storage",
            component = "filesystem",
            op = "put_object",
            container = %locator.container,
            object_key = %locator.object_key,
            doc_bytes = data.len(),
            "Writing object"
        );

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = full_path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &full_path).await?;
        Ok(())
    }

    /// Write the tag sidecar for an object.
    pub async fn put_tags(
        &self,
        locator: &StorageLocator,
        tags: &HashMap<String, String>,
    ) -> Result<()> {
        let path = self.tags_path(locator);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(tags)?;
        fs::write(path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FilesystemStore {
    async fn fetch(&self, locator: &StorageLocator) -> Result<Vec<u8>> {
        let path = self.object_path(locator);
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(format!("object {}", locator)))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn tags(&self, locator: &StorageLocator) -> Result<HashMap<String, String>> {
        let path = self.tags_path(locator);
        match fs::read(&path).await {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> StorageLocator {
        StorageLocator::new(
            "referrals",
            "patients/p-1/documents/current_labs/g-1/report.pdf",
        )
    }

    #[tokio::test]
    async fn test_put_then_fetch_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path());
        let loc = locator();

        store.put_object(&loc, b"pdf bytes").await.unwrap();
        let data = store.fetch(&loc).await.unwrap();
        assert_eq!(data, b"pdf bytes");
    }

    #[tokio::test]
    async fn test_fetch_missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path());

        let err = store.fetch(&locator()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_tags_sidecar_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path());
        let loc = locator();

        let mut tags = HashMap::new();
        tags.insert("patient-id".to_string(), "p-1".to_string());
        tags.insert("document-type".to_string(), "current_labs".to_string());
        store.put_tags(&loc, &tags).await.unwrap();

        let read_back = store.tags(&loc).await.unwrap();
        assert_eq!(read_back, tags);
    }

    #[tokio::test]
    async fn test_missing_sidecar_is_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path());
        let loc = locator();
        store.put_object(&loc, b"untagged").await.unwrap();

        let tags = store.tags(&loc).await.unwrap();
        assert!(tags.is_empty());
    }
}
