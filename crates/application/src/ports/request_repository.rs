//! Request file repository port.

use std::future::Future;
use std::path::Path;

use parcel_domain::RequestDocument;

use super::StorageError;

/// Reads and writes one [`RequestDocument`] per request file.
pub trait RequestRepository: Send + Sync {
    /// Loads the document stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidContent`] if the file does not decode,
    /// or the underlying storage error.
    fn load(&self, path: &Path) -> impl Future<Output = Result<RequestDocument, StorageError>> + Send;

    /// Writes `document` to `path`, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be encoded or written.
    fn save(
        &self,
        path: &Path,
        document: &RequestDocument,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}
