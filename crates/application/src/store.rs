//! Workspace store: the session state shared by every workspace operation.
//!
//! The store is an explicit object handed to the components that need it.
//! State is read once from a [`WorkspaceStateRepository`] and written back by
//! [`WorkspaceStore::flush`] whenever a setter changed something.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use parcel_domain::persistence::CURRENT_SCHEMA_VERSION;
use parcel_domain::{Collection, CollectionRef, WorkspaceState, tree};
use tracing::{debug, warn};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{StateStoreError, WorkspaceStateRepository};

/// How the selected collection was settled by [`WorkspaceStore::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionResolution {
    /// The selection still names an open collection.
    Unchanged,
    /// The only open collection was selected.
    AutoSelected(String),
    /// Several collections are open and none is selected; ask the user.
    NeedsUserChoice(Vec<CollectionRef>),
    /// No collection is open.
    Empty,
}

/// Outcome of [`WorkspaceStore::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// How the selection was settled.
    pub selection: SelectionResolution,
    /// Active file dropped because no open collection owns it.
    pub cleared_active_file: Option<PathBuf>,
}

/// Session state: open collections, expanded paths, selection, active file
/// and autosave preference.
#[derive(Debug)]
pub struct WorkspaceStore<W> {
    repository: W,
    collections: Vec<Collection>,
    pending_restore: Vec<CollectionRef>,
    expanded: BTreeSet<PathBuf>,
    selected: Option<String>,
    active_file: Option<PathBuf>,
    autosave: bool,
    changed: bool,
}

impl<W: WorkspaceStateRepository> WorkspaceStore<W> {
    /// Creates a store from already loaded state.
    ///
    /// Persisted collection references are kept aside until
    /// [`take_pending_restore`](Self::take_pending_restore) hands them to the
    /// tree loader.
    #[must_use]
    pub fn new(repository: W, state: WorkspaceState) -> Self {
        Self {
            repository,
            collections: Vec::new(),
            pending_restore: state.collections,
            expanded: state.expanded_nodes,
            selected: state.selected_collection,
            active_file: state.active_file,
            autosave: state.autosave,
            changed: false,
        }
    }

    /// Loads persisted state through the repository.
    ///
    /// An unreadable state file is logged and replaced by the default state
    /// so the session can still start.
    pub async fn load(repository: W) -> Self {
        let state = match repository.load().await {
            Ok(state) => state,
            Err(error) => {
                warn!(%error, "workspace state unreadable, starting empty");
                WorkspaceState::default()
            }
        };
        Self::new(repository, state)
    }

    /// Returns the persisted collection references not yet restored.
    pub fn take_pending_restore(&mut self) -> Vec<CollectionRef> {
        std::mem::take(&mut self.pending_restore)
    }

    /// Returns the open collections in the order they were opened.
    #[must_use]
    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    /// Looks up an open collection by id.
    #[must_use]
    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    /// Mutable lookup, used to swap in refreshed snapshots.
    pub fn collection_mut(&mut self, id: &str) -> Option<&mut Collection> {
        self.collections.iter_mut().find(|c| c.id == id)
    }

    /// Returns true if a collection with this root is open.
    #[must_use]
    pub fn is_open(&self, root: &Path) -> bool {
        self.collections.iter().any(|c| c.path == root)
    }

    /// Adds an opened collection.
    pub fn add_collection(&mut self, collection: Collection) {
        debug!(id = %collection.id, path = %collection.path.display(), "collection added");
        self.collections.push(collection);
        self.changed = true;
    }

    /// Removes a collection, returning it.
    pub fn remove_collection(&mut self, id: &str) -> Option<Collection> {
        let index = self.collections.iter().position(|c| c.id == id)?;
        self.changed = true;
        Some(self.collections.remove(index))
    }

    /// Returns the collection owning `path`; the deepest root wins when roots
    /// are nested.
    #[must_use]
    pub fn owner_of(&self, path: &Path) -> Option<&Collection> {
        self.collections
            .iter()
            .filter(|c| c.contains_path(path))
            .max_by_key(|c| c.path.components().count())
    }

    /// Returns the expanded directory paths.
    #[must_use]
    pub const fn expanded_nodes(&self) -> &BTreeSet<PathBuf> {
        &self.expanded
    }

    /// Returns true if the directory is shown expanded.
    #[must_use]
    pub fn is_expanded(&self, path: &Path) -> bool {
        self.expanded.contains(path)
    }

    /// Marks a directory expanded. Returns false if it already was.
    pub fn expand(&mut self, path: impl Into<PathBuf>) -> bool {
        let inserted = self.expanded.insert(path.into());
        self.changed |= inserted;
        inserted
    }

    /// Flips the expansion of a directory and returns the new state.
    pub fn toggle_expanded(&mut self, path: &Path) -> bool {
        self.changed = true;
        if self.expanded.remove(path) {
            false
        } else {
            self.expanded.insert(path.to_path_buf());
            true
        }
    }

    /// Removes every expanded path at or below `root`. Returns how many.
    pub fn remove_expanded_under(&mut self, root: &Path) -> usize {
        let before = self.expanded.len();
        self.expanded.retain(|p| !p.starts_with(root));
        let removed = before - self.expanded.len();
        self.changed |= removed > 0;
        removed
    }

    /// Moves expanded paths and the active file from `from` to `to`.
    pub fn relocate_paths(&mut self, from: &Path, to: &Path) {
        let moved: Vec<PathBuf> = self
            .expanded
            .iter()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();
        for old in moved {
            self.expanded.remove(&old);
            if let Some(new) = tree::relocate(&old, from, to) {
                self.expanded.insert(new);
            }
            self.changed = true;
        }
        let relocated = self
            .active_file
            .as_deref()
            .and_then(|active| tree::relocate(active, from, to));
        if relocated.is_some() {
            self.active_file = relocated;
            self.changed = true;
        }
    }

    /// Returns the selected collection.
    #[must_use]
    pub fn selected_collection(&self) -> Option<&Collection> {
        self.selected.as_deref().and_then(|id| self.collection(id))
    }

    /// Returns the selected collection id, even if it no longer resolves.
    #[must_use]
    pub fn selected_collection_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Selects an open collection.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::UnknownCollection`] if no open collection
    /// has this id.
    pub fn select_collection(&mut self, id: &str) -> ApplicationResult<()> {
        if self.collection(id).is_none() {
            return Err(ApplicationError::UnknownCollection(id.to_string()));
        }
        if self.selected.as_deref() != Some(id) {
            self.selected = Some(id.to_string());
            self.changed = true;
        }
        Ok(())
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.changed = true;
        }
    }

    /// Returns the path of the file being edited.
    #[must_use]
    pub fn active_file(&self) -> Option<&Path> {
        self.active_file.as_deref()
    }

    /// Sets or clears the file being edited.
    pub fn set_active_file(&mut self, path: Option<PathBuf>) {
        if self.active_file != path {
            self.active_file = path;
            self.changed = true;
        }
    }

    /// Returns the autosave preference.
    #[must_use]
    pub const fn autosave(&self) -> bool {
        self.autosave
    }

    /// Sets the autosave preference.
    pub fn set_autosave(&mut self, enabled: bool) {
        if self.autosave != enabled {
            self.autosave = enabled;
            self.changed = true;
        }
    }

    /// Re-establishes the selection invariants after collections changed.
    ///
    /// A dangling selection is dropped; the sole open collection is selected
    /// automatically; with several and no selection the caller must ask the
    /// user. An active file outside every open collection is cleared.
    pub fn reconcile(&mut self) -> Reconciliation {
        let orphaned = self
            .active_file
            .as_deref()
            .is_some_and(|active| self.owner_of(active).is_none());
        let cleared_active_file = if orphaned {
            self.changed = true;
            self.active_file.take()
        } else {
            None
        };

        if self.selected_collection().is_none() {
            self.clear_selection();
        }

        let selection = if self.selected.is_some() {
            SelectionResolution::Unchanged
        } else {
            match self.collections.as_slice() {
                [] => SelectionResolution::Empty,
                [only] => {
                    let id = only.id.clone();
                    self.selected = Some(id.clone());
                    self.changed = true;
                    SelectionResolution::AutoSelected(id)
                }
                many => SelectionResolution::NeedsUserChoice(
                    many.iter().map(Collection::to_ref).collect(),
                ),
            }
        };

        Reconciliation {
            selection,
            cleared_active_file,
        }
    }

    /// Returns the persisted form of the current state.
    #[must_use]
    pub fn snapshot(&self) -> WorkspaceState {
        WorkspaceState {
            active_file: self.active_file.clone(),
            autosave: self.autosave,
            collections: self.collections.iter().map(Collection::to_ref).collect(),
            expanded_nodes: self.expanded.clone(),
            schema_version: CURRENT_SCHEMA_VERSION,
            selected_collection: self.selected.clone(),
        }
    }

    /// Returns true if state changed since the last successful flush.
    #[must_use]
    pub const fn has_unflushed_changes(&self) -> bool {
        self.changed
    }

    /// Writes the state if anything changed.
    ///
    /// On failure the change marker stays set, so the next flush retries.
    ///
    /// # Errors
    ///
    /// Returns the repository error.
    pub async fn flush(&mut self) -> Result<(), StateStoreError> {
        if !self.changed {
            return Ok(());
        }
        self.repository.save(&self.snapshot()).await?;
        self.changed = false;
        debug!("workspace state flushed");
        Ok(())
    }
}
