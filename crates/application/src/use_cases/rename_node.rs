//! Rename node use case.
//!
//! Storage has no move primitive, so a rename copies the node to its new path
//! and then deletes the original. Files are copied as bytes. A copy that fails
//! partway removes whatever it created, leaving only the original. If the
//! original survives the delete, the delete is retried once before the partial
//! result is reported.

use std::path::{Path, PathBuf};

use parcel_domain::tree::{relocate, validate_node_name};
use parcel_domain::{DirectoryTree, DomainError, NodeKind, TreeSnapshot};
use tracing::{info, warn};

use super::create_node::check_free;
use super::ensure_not_root;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::Storage;

const DELETE_ATTEMPTS: usize = 2;

/// Outcome of a rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The node now lives at `to`.
    Renamed {
        /// Previous path.
        from: PathBuf,
        /// New path.
        to: PathBuf,
    },
    /// The new name equals the old one; nothing was done.
    Unchanged(PathBuf),
}

/// Use case for renaming a file or directory in place.
#[derive(Debug, Clone)]
pub struct RenameNode<S> {
    storage: S,
}

impl<S: Storage> RenameNode<S> {
    /// Creates a new `RenameNode` use case.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Renames `old_path` to `new_base` within the same directory.
    ///
    /// Files keep their extension; a typed extension is not doubled.
    ///
    /// # Errors
    /// - [`ApplicationError::NameConflict`] before any mutation if the target
    ///   name is taken
    /// - [`ApplicationError::PartialRename`] if the copy exists but the
    ///   original could not be removed
    /// - [`ApplicationError::StorageUnavailable`] if the copy fails; the
    ///   partial target is removed first
    pub async fn execute(
        &self,
        snapshot: &TreeSnapshot,
        old_path: &Path,
        kind: NodeKind,
        new_base: &str,
    ) -> ApplicationResult<RenameOutcome> {
        ensure_not_root(snapshot, old_path)?;
        if !snapshot.contains(old_path) {
            return Err(ApplicationError::NodeNotFound(old_path.to_path_buf()));
        }
        let base = validate_node_name(new_base)?;
        let parent = old_path
            .parent()
            .ok_or_else(|| DomainError::InvalidPath(old_path.display().to_string()))?;

        let new_name = match (kind, old_path.extension()) {
            (NodeKind::File, Some(ext)) => {
                let ext = ext.to_string_lossy();
                let suffix = format!(".{ext}");
                let stem = base
                    .strip_suffix(suffix.as_str())
                    .filter(|s| !s.is_empty())
                    .unwrap_or(base);
                format!("{stem}.{ext}")
            }
            _ => base.to_string(),
        };
        let new_path = parent.join(&new_name);
        if new_path == old_path {
            return Ok(RenameOutcome::Unchanged(new_path));
        }

        check_free(snapshot, parent, &new_name)?;
        // The snapshot may be stale; the cleanup below must only remove what
        // this rename created.
        if self.storage.exists(&new_path).await {
            return Err(ApplicationError::NameConflict {
                parent: parent.to_path_buf(),
                name: new_name,
            });
        }

        let copied: ApplicationResult<()> = match kind {
            NodeKind::File => self.storage.copy_file(old_path, &new_path).await.map_err(Into::into),
            NodeKind::Directory => {
                let tree = self.storage.get_directory_tree(old_path).await?;
                self.copy_tree(&tree, old_path, &new_path).await
            }
        };
        if let Err(e) = copied {
            self.discard_partial_copy(&new_path, kind).await;
            return Err(e);
        }

        self.remove_original(old_path, kind, &new_path).await?;
        info!(from = %old_path.display(), to = %new_path.display(), "node renamed");
        Ok(RenameOutcome::Renamed {
            from: old_path.to_path_buf(),
            to: new_path,
        })
    }

    async fn copy_tree(&self, tree: &DirectoryTree, from: &Path, to: &Path) -> ApplicationResult<()> {
        // walk() yields parents before children, so directories exist first.
        for node in tree.walk() {
            let target = relocate(node.path(), from, to)
                .ok_or_else(|| DomainError::InvalidPath(node.path().display().to_string()))?;
            if node.is_directory() {
                self.storage.create_directory(&target).await?;
            } else {
                self.storage.copy_file(node.path(), &target).await?;
            }
        }
        Ok(())
    }

    async fn discard_partial_copy(&self, target: &Path, kind: NodeKind) {
        if !self.storage.exists(target).await {
            return;
        }
        let removed = match kind {
            NodeKind::File => self.storage.delete_file(target).await,
            NodeKind::Directory => self.storage.delete_directory(target).await,
        };
        match removed {
            Ok(()) => warn!(path = %target.display(), "removed partial rename target"),
            Err(e) => warn!(path = %target.display(), error = %e, "partial rename target left behind"),
        }
    }

    async fn remove_original(&self, old: &Path, kind: NodeKind, new: &Path) -> ApplicationResult<()> {
        for attempt in 1..=DELETE_ATTEMPTS {
            let result = match kind {
                NodeKind::File => self.storage.delete_file(old).await,
                NodeKind::Directory => self.storage.delete_directory(old).await,
            };
            if !self.storage.exists(old).await {
                return Ok(());
            }
            warn!(
                path = %old.display(),
                attempt,
                error = ?result.err(),
                "original still present after rename"
            );
        }
        Err(ApplicationError::PartialRename {
            old: old.to_path_buf(),
            new: new.to_path_buf(),
        })
    }
}
