//! Collections: user-opened folders used as browsing roots.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::tree::{DirectoryTree, TreeSnapshot};

/// Persisted reference to an open collection.
///
/// Tree snapshots are never persisted; they are rebuilt from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRef {
    /// Opaque id generated when the folder was opened.
    pub id: String,
    /// Display name, the folder's final component.
    pub name: String,
    /// Root directory of the collection.
    pub path: PathBuf,
}

/// An open collection with its current tree snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// Opaque id generated when the folder was opened.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Root directory of the collection.
    pub path: PathBuf,
    snapshot: TreeSnapshot,
}

impl Collection {
    /// Creates a collection rooted at the snapshot's root.
    #[must_use]
    pub fn new(id: impl Into<String>, snapshot: TreeSnapshot) -> Self {
        let path = snapshot.root().to_path_buf();
        Self {
            id: id.into(),
            name: snapshot.tree().entry.name.clone(),
            path,
            snapshot,
        }
    }

    /// Rebuilds an open collection from its persisted reference.
    #[must_use]
    pub fn from_ref(reference: CollectionRef, snapshot: TreeSnapshot) -> Self {
        Self {
            id: reference.id,
            name: reference.name,
            path: reference.path,
            snapshot,
        }
    }

    /// Returns the mirrored tree.
    #[must_use]
    pub const fn tree(&self) -> &DirectoryTree {
        self.snapshot.tree()
    }

    /// Returns the tree together with its path index.
    #[must_use]
    pub const fn snapshot(&self) -> &TreeSnapshot {
        &self.snapshot
    }

    /// Swaps in a freshly loaded snapshot.
    pub fn replace_snapshot(&mut self, snapshot: TreeSnapshot) {
        self.snapshot = snapshot;
    }

    /// Returns true if `path` is the root or lies beneath it.
    ///
    /// Matching is per path component, so `/ws/api2` is not inside `/ws/api`.
    #[must_use]
    pub fn contains_path(&self, path: &Path) -> bool {
        path.starts_with(&self.path)
    }

    /// Returns the persisted reference for this collection.
    #[must_use]
    pub fn to_ref(&self) -> CollectionRef {
        CollectionRef {
            id: self.id.clone(),
            name: self.name.clone(),
            path: self.path.clone(),
        }
    }
}
