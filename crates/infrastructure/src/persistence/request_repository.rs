//! Request file repository on top of any [`Storage`].

use std::path::Path;

use parcel_application::ports::{RequestRepository, Storage, StorageError};
use parcel_domain::RequestDocument;

use crate::serialization::{from_json, to_json_stable};

/// Stores each [`RequestDocument`] as a stable JSON file.
#[derive(Debug, Clone)]
pub struct FileRequestRepository<S: Storage> {
    storage: S,
}

impl<S: Storage> FileRequestRepository<S> {
    /// Creates a repository writing through `storage`.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }
}

impl<S: Storage> RequestRepository for FileRequestRepository<S> {
    async fn load(&self, path: &Path) -> Result<RequestDocument, StorageError> {
        let content = self.storage.read_file(path).await?;
        from_json(&content).map_err(|e| StorageError::InvalidContent {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    async fn save(&self, path: &Path, document: &RequestDocument) -> Result<(), StorageError> {
        let json = to_json_stable(document).map_err(|e| StorageError::InvalidContent {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        self.storage.create_file(path, &json).await
    }
}
