use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{ResultStore, StorageError};

/// Writes the final digit string to a file, replacing any previous content
#[derive(Debug, Clone)]
pub struct FileResultStore {
    path: PathBuf,
}

impl FileResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ResultStore for FileResultStore {
    async fn save(&self, digits: &str) -> Result<PathBuf, StorageError> {
        let write_error = |source| StorageError::ResultWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
        }
        tokio::fs::write(&self.path, digits).await.map_err(write_error)?;

        info!(path = %self.path.display(), bytes = digits.len(), "Saved result");
        Ok(self.path.clone())
    }

    fn destination(&self) -> &Path {
        &self.path
    }
}
