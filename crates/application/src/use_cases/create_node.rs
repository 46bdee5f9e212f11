//! Create node use case.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parcel_domain::request::{request_base_name, request_file_name};
use parcel_domain::tree::validate_node_name;
use parcel_domain::{NodeKind, RequestDocument, TreeSnapshot};
use tracing::info;

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{Clock, RequestRepository, Storage, StorageError};

/// Input for creating a node.
#[derive(Debug, Clone)]
pub struct CreateNodeInput {
    /// Directory receiving the node.
    pub parent: PathBuf,
    /// File or directory.
    pub kind: NodeKind,
    /// Name typed by the user; trimmed, and given the request extension for
    /// files.
    pub name: String,
}

/// Use case for creating a request file or a directory.
pub struct CreateNode<S, Q> {
    storage: S,
    requests: Q,
    clock: Arc<dyn Clock>,
}

impl<S: Storage, Q: RequestRepository> CreateNode<S, Q> {
    /// Creates a new `CreateNode` use case.
    #[must_use]
    pub fn new(storage: S, requests: Q, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            requests,
            clock,
        }
    }

    /// Creates the node and returns its path.
    ///
    /// The sibling check runs against `snapshot` before storage is touched.
    ///
    /// # Errors
    /// - [`ApplicationError::Domain`] for a blank or malformed name
    /// - [`ApplicationError::NodeNotFound`] if the parent is not in the tree
    /// - [`ApplicationError::NameConflict`] if the final name is taken
    /// - [`ApplicationError::StorageUnavailable`] if the write fails
    pub async fn execute(
        &self,
        snapshot: &TreeSnapshot,
        input: CreateNodeInput,
    ) -> ApplicationResult<PathBuf> {
        let name = validate_node_name(&input.name)?;
        let final_name = match input.kind {
            NodeKind::Directory => name.to_string(),
            NodeKind::File => request_file_name(request_base_name(name)),
        };

        check_free(snapshot, &input.parent, &final_name)?;

        let path = input.parent.join(&final_name);
        match input.kind {
            NodeKind::Directory => self.storage.create_directory(&path).await?,
            NodeKind::File => {
                let document = RequestDocument::new(self.clock.now());
                self.requests.save(&path, &document).await?;
            }
        }

        info!(path = %path.display(), kind = ?input.kind, "node created");
        Ok(path)
    }
}

/// Fails unless `parent` is a known directory without a child named `name`.
pub(crate) fn check_free(snapshot: &TreeSnapshot, parent: &Path, name: &str) -> ApplicationResult<()> {
    let node = snapshot
        .node(parent)
        .ok_or_else(|| ApplicationError::NodeNotFound(parent.to_path_buf()))?;
    if !node.entry.is_directory {
        return Err(StorageError::NotADirectory(parent.to_path_buf()).into());
    }
    if node.has_child(name) {
        return Err(ApplicationError::NameConflict {
            parent: parent.to_path_buf(),
            name: name.to_string(),
        });
    }
    Ok(())
}
