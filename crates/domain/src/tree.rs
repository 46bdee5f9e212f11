//! In-memory mirror of an on-disk directory tree.
//!
//! A [`DirectoryTree`] is a point-in-time snapshot of one root directory. It is
//! rebuilt, never patched, whenever the storage is re-read. [`TreeSnapshot`]
//! pairs a tree with a path index so that lookups by path do not walk the tree.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A single file or directory as reported by storage.
///
/// Fields are ordered alphabetically for deterministic serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemEntry {
    /// Whether the entry is a directory.
    pub is_directory: bool,
    /// Last modification time as Unix seconds.
    pub modified_time: i64,
    /// Final path component.
    pub name: String,
    /// Absolute path, unique across the whole workspace.
    pub path: PathBuf,
    /// Size in bytes as reported by storage.
    pub size: u64,
}

impl FileSystemEntry {
    /// Creates a file entry; the name is derived from the path.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>, size: u64, modified_time: i64) -> Self {
        let path = path.into();
        Self {
            is_directory: false,
            modified_time,
            name: display_name(&path),
            path,
            size,
        }
    }

    /// Creates a directory entry; the name is derived from the path.
    #[must_use]
    pub fn directory(path: impl Into<PathBuf>, modified_time: i64) -> Self {
        let path = path.into();
        Self {
            is_directory: true,
            modified_time,
            name: display_name(&path),
            path,
            size: 0,
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// A node of the mirrored tree. Only directories carry `children`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryTree {
    /// Child nodes, directories first and then by name. `None` for files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DirectoryTree>>,
    /// The entry this node describes.
    pub entry: FileSystemEntry,
}

impl DirectoryTree {
    /// Creates a leaf node for a file.
    #[must_use]
    pub const fn leaf(entry: FileSystemEntry) -> Self {
        Self {
            children: None,
            entry,
        }
    }

    /// Creates a directory node, sorting the children directories-first.
    #[must_use]
    pub fn directory(entry: FileSystemEntry, mut children: Vec<Self>) -> Self {
        children.sort_by(|a, b| {
            b.entry
                .is_directory
                .cmp(&a.entry.is_directory)
                .then_with(|| a.entry.name.cmp(&b.entry.name))
        });
        Self {
            children: Some(children),
            entry,
        }
    }

    /// Returns the node path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.entry.path
    }

    /// Returns true for directory nodes.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        self.entry.is_directory
    }

    /// Returns the children, or an empty slice for files.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Returns true if this node has at least one child.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// Iterates over this node and all descendants, depth-first, parents
    /// before children.
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Depth-first iterator returned by [`DirectoryTree::walk`].
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<&'a DirectoryTree>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a DirectoryTree;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Whether a node is a request file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A request file.
    File,
    /// A directory.
    Directory,
}

impl NodeKind {
    /// Maps the `is_directory` flag of an entry.
    #[must_use]
    pub const fn of(entry: &FileSystemEntry) -> Self {
        if entry.is_directory {
            Self::Directory
        } else {
            Self::File
        }
    }
}

/// Index entry kept for every node of a [`TreeSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedNode {
    /// The node's entry.
    pub entry: FileSystemEntry,
    /// Names of the direct children (empty for files).
    pub child_names: BTreeSet<String>,
}

impl IndexedNode {
    /// Returns true if a direct child has exactly this name.
    #[must_use]
    pub fn has_child(&self, name: &str) -> bool {
        self.child_names.contains(name)
    }

    /// Returns true if the node has at least one child.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.child_names.is_empty()
    }
}

/// An immutable tree plus a path index built from it in one pass.
///
/// Snapshots are replaced wholesale on refresh, so the index can never drift
/// from the tree it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSnapshot {
    tree: DirectoryTree,
    index: HashMap<PathBuf, IndexedNode>,
}

impl TreeSnapshot {
    /// Builds the snapshot and its index.
    #[must_use]
    pub fn new(tree: DirectoryTree) -> Self {
        let index = tree
            .walk()
            .map(|node| {
                let indexed = IndexedNode {
                    entry: node.entry.clone(),
                    child_names: node
                        .children()
                        .iter()
                        .map(|child| child.entry.name.clone())
                        .collect(),
                };
                (node.entry.path.clone(), indexed)
            })
            .collect();
        Self { tree, index }
    }

    /// Returns the mirrored tree.
    #[must_use]
    pub const fn tree(&self) -> &DirectoryTree {
        &self.tree
    }

    /// Returns the root path of the snapshot.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.tree.path()
    }

    /// Looks up a node by path.
    #[must_use]
    pub fn node(&self, path: &Path) -> Option<&IndexedNode> {
        self.index.get(path)
    }

    /// Returns true if the path is part of this snapshot.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.index.contains_key(path)
    }

    /// Number of indexed nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Always false: a snapshot contains at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Validates a user-supplied node name and returns it trimmed.
///
/// # Errors
///
/// Returns [`DomainError::InvalidName`] for blank names, `.`/`..`, and names
/// containing a path separator.
pub fn validate_node_name(name: &str) -> DomainResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
    {
        return Err(DomainError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

/// Maps `path` from under `from` to the same position under `to`.
///
/// Returns `None` when `path` is not `from` or one of its descendants.
#[must_use]
pub fn relocate(path: &Path, from: &Path, to: &Path) -> Option<PathBuf> {
    let rest = path.strip_prefix(from).ok()?;
    if rest.as_os_str().is_empty() {
        Some(to.to_path_buf())
    } else {
        Some(to.join(rest))
    }
}
