use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::models::ProgressUpdate;

/// Error type for reference and result storage
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to read reference {}: {source}", path.display())]
    ReferenceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write result to {}: {source}", path.display())]
    ResultWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Receiver of partial results while a calculation runs.
///
/// Called on the thread that runs the engine. Implementations that feed a
/// display on another thread must hand the update over rather than touch
/// shared display state directly.
pub trait ProgressSink {
    fn on_progress(&mut self, update: &ProgressUpdate);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressUpdate),
{
    fn on_progress(&mut self, update: &ProgressUpdate) {
        self(update);
    }
}

/// Sink that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_progress(&mut self, _update: &ProgressUpdate) {}
}

/// Source of a reference expansion of pi
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    /// Load the reference text.
    ///
    /// # Returns
    /// * `Ok(Some(text))` if a reference exists
    /// * `Ok(None)` if there is no reference (verification is skipped)
    /// * `Err(StorageError)` if the reference exists but cannot be read
    async fn load_reference(&self) -> Result<Option<String>, StorageError>;
}

/// Destination for the final digit string
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist the full digit string.
    ///
    /// # Returns
    /// * `Ok(path)` naming where the digits were written
    /// * `Err(StorageError)` if the destination is not writable
    async fn save(&self, digits: &str) -> Result<PathBuf, StorageError>;

    /// Where [`ResultStore::save`] writes to.
    fn destination(&self) -> &Path;
}
