//! Delete node use case.

use std::path::{Path, PathBuf};

use parcel_domain::{NodeKind, TreeSnapshot};
use tracing::info;

use super::ensure_not_root;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::Storage;

/// A recursive delete waiting for the user's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    /// Directory to remove.
    pub path: PathBuf,
    /// Number of direct children that will go with it.
    pub children: usize,
}

/// Outcome of [`DeleteNode::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The node was removed.
    Deleted(PathBuf),
    /// The node is a non-empty directory; call [`DeleteNode::confirm`].
    ConfirmationRequired(PendingDelete),
}

/// Use case for deleting files and directories.
#[derive(Debug, Clone)]
pub struct DeleteNode<S> {
    storage: S,
}

impl<S: Storage> DeleteNode<S> {
    /// Creates a new `DeleteNode` use case.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Deletes a file or an empty directory right away; a directory with
    /// children needs confirmation first.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::NodeNotFound`] if the path is not in the
    /// tree, or the storage error.
    pub async fn execute(&self, snapshot: &TreeSnapshot, path: &Path) -> ApplicationResult<DeleteOutcome> {
        ensure_not_root(snapshot, path)?;
        let node = snapshot
            .node(path)
            .ok_or_else(|| ApplicationError::NodeNotFound(path.to_path_buf()))?;

        if node.entry.is_directory && node.has_children() {
            return Ok(DeleteOutcome::ConfirmationRequired(PendingDelete {
                path: path.to_path_buf(),
                children: node.child_names.len(),
            }));
        }

        self.remove(path, NodeKind::of(&node.entry)).await?;
        Ok(DeleteOutcome::Deleted(path.to_path_buf()))
    }

    /// Performs a confirmed recursive delete.
    ///
    /// # Errors
    ///
    /// Returns the storage error.
    pub async fn confirm(&self, pending: PendingDelete) -> ApplicationResult<PathBuf> {
        self.remove(&pending.path, NodeKind::Directory).await?;
        Ok(pending.path)
    }

    async fn remove(&self, path: &Path, kind: NodeKind) -> ApplicationResult<()> {
        match kind {
            NodeKind::File => self.storage.delete_file(path).await?,
            NodeKind::Directory => self.storage.delete_directory(path).await?,
        }
        info!(path = %path.display(), ?kind, "node deleted");
        Ok(())
    }
}
