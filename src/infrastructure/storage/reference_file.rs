use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{ReferenceSource, StorageError};

/// Reference expansion stored as a plain-text file
#[derive(Debug, Clone)]
pub struct FileReference {
    path: PathBuf,
}

impl FileReference {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReferenceSource for FileReference {
    async fn load_reference(&self) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => {
                debug!(path = %self.path.display(), bytes = text.len(), "Loaded reference");
                Ok(Some(text))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No reference file");
                Ok(None)
            }
            Err(source) => Err(StorageError::ReferenceRead {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_existing_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pi_reference.txt");
        tokio::fs::write(&path, "3.14159\n").await.unwrap();

        let reference = FileReference::new(&path).load_reference().await.unwrap();
        assert_eq!(reference.as_deref(), Some("3.14159\n"));
    }

    #[tokio::test]
    async fn test_missing_reference_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let reference = FileReference::new(dir.path().join("absent.txt"))
            .load_reference()
            .await
            .unwrap();
        assert!(reference.is_none());
    }

    #[tokio::test]
    async fn test_directory_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileReference::new(dir.path())
            .load_reference()
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::ReferenceRead { .. }));
    }
}
