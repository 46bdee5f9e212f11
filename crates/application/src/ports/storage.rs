//! Storage port.
//!
//! Directory-tree retrieval and primitive file and directory operations.
//! Every mutation the workspace performs goes through this trait.

use std::future::Future;
use std::path::{Path, PathBuf};

use parcel_domain::DirectoryTree;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Path does not exist.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Access denied.
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// Path already exists.
    #[error("already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Path is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// File content could not be decoded.
    #[error("invalid content in {}: {message}", path.display())]
    InvalidContent {
        /// File that failed to decode.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Abstraction over the file system backing the collections.
pub trait Storage: Send + Sync {
    /// Builds the tree rooted at `root`, children sorted directories-first.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is missing or inaccessible.
    fn get_directory_tree(
        &self,
        root: &Path,
    ) -> impl Future<Output = Result<DirectoryTree, StorageError>> + Send;

    /// Creates a single directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path exists or the parent is missing.
    fn create_directory(&self, path: &Path)
    -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Writes `content` to a file, creating or replacing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn create_file(
        &self,
        path: &Path,
        content: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Reads a file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read_file(&self, path: &Path) -> impl Future<Output = Result<String, StorageError>> + Send;

    /// Copies the bytes of `from` into `to`, creating or replacing `to`.
    ///
    /// Content is not decoded, so binary files survive the copy.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` cannot be read or `to` cannot be written.
    fn copy_file(
        &self,
        from: &Path,
        to: &Path,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Removes a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be removed.
    fn delete_file(&self, path: &Path) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Removes a directory and everything below it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    fn delete_directory(&self, path: &Path)
    -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> impl Future<Output = bool> + Send;
}
