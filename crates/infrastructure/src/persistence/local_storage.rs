//! Local file system storage.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::UNIX_EPOCH;

use parcel_application::ports::{Storage, StorageError};
use parcel_domain::{DirectoryTree, FileSystemEntry};
use tokio::fs;

type TreeFuture<'a> = Pin<Box<dyn Future<Output = Result<DirectoryTree, StorageError>> + Send + 'a>>;

/// [`Storage`] backed by the local disk through `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    /// Creates a new `LocalStorage`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn map_io(path: &Path, error: std::io::Error) -> StorageError {
        match error.kind() {
            ErrorKind::NotFound => StorageError::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => StorageError::PermissionDenied(path.to_path_buf()),
            ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.to_path_buf()),
            _ => StorageError::Io(error),
        }
    }

    fn modified_secs(metadata: &std::fs::Metadata) -> i64 {
        metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .and_then(|elapsed| i64::try_from(elapsed.as_secs()).ok())
            .unwrap_or_default()
    }

    /// Reads one directory level and recurses into subdirectories.
    ///
    /// Children that vanish or cannot be read while walking are skipped.
    fn read_tree(path: PathBuf) -> TreeFuture<'static> {
        Box::pin(async move {
            let metadata = fs::metadata(&path)
                .await
                .map_err(|e| Self::map_io(&path, e))?;

            if !metadata.is_dir() {
                return Ok(DirectoryTree::leaf(FileSystemEntry::file(
                    &path,
                    metadata.len(),
                    Self::modified_secs(&metadata),
                )));
            }

            let entry = FileSystemEntry::directory(&path, Self::modified_secs(&metadata));
            let mut dir = fs::read_dir(&path)
                .await
                .map_err(|e| Self::map_io(&path, e))?;

            let mut children = Vec::new();
            loop {
                let next = match dir.next_entry().await {
                    Ok(Some(next)) => next,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Stopped listing directory");
                        break;
                    }
                };

                match Self::read_tree(next.path()).await {
                    Ok(child) => children.push(child),
                    Err(e) => {
                        tracing::debug!(path = %next.path().display(), error = %e, "Skipping unreadable entry");
                    }
                }
            }

            Ok(DirectoryTree::directory(entry, children))
        })
    }
}

impl Storage for LocalStorage {
    async fn get_directory_tree(&self, root: &Path) -> Result<DirectoryTree, StorageError> {
        let metadata = fs::metadata(root)
            .await
            .map_err(|e| Self::map_io(root, e))?;
        if !metadata.is_dir() {
            return Err(StorageError::NotADirectory(root.to_path_buf()));
        }
        Self::read_tree(root.to_path_buf()).await
    }

    async fn create_directory(&self, path: &Path) -> Result<(), StorageError> {
        tracing::debug!(path = %path.display(), "Creating directory");
        fs::create_dir(path).await.map_err(|e| Self::map_io(path, e))
    }

    async fn create_file(&self, path: &Path, content: &str) -> Result<(), StorageError> {
        tracing::debug!(path = %path.display(), bytes = content.len(), "Writing file");
        fs::write(path, content)
            .await
            .map_err(|e| Self::map_io(path, e))
    }

    async fn read_file(&self, path: &Path) -> Result<String, StorageError> {
        fs::read_to_string(path)
            .await
            .map_err(|e| Self::map_io(path, e))
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        tracing::debug!(from = %from.display(), to = %to.display(), "Copying file");
        fs::copy(from, to).await.map_err(|e| Self::map_io(from, e))?;
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> Result<(), StorageError> {
        tracing::debug!(path = %path.display(), "Deleting file");
        fs::remove_file(path)
            .await
            .map_err(|e| Self::map_io(path, e))
    }

    async fn delete_directory(&self, path: &Path) -> Result<(), StorageError> {
        tracing::debug!(path = %path.display(), "Deleting directory");
        fs::remove_dir_all(path)
            .await
            .map_err(|e| Self::map_io(path, e))
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }
}
