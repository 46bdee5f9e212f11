//! Workspace: tree navigation and mutations with their side effects.
//!
//! Every operation follows the same shape: resolve the owning collection,
//! select it, run the use case, refresh the affected trees, notify document
//! views, then flush the store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parcel_domain::request::is_request_file;
use parcel_domain::{CollectionRef, NodeKind, TreeSnapshot};
use tracing::{debug, info, warn};

use crate::error::{ApplicationError, ApplicationResult};
use crate::events::EventCoordinator;
use crate::ports::{Clock, FolderPicker, RequestRepository, Storage, WorkspaceStateRepository};
use crate::store::{Reconciliation, SelectionResolution, WorkspaceStore};
use crate::use_cases::{
    CollectionLoader, CreateNode, CreateNodeInput, DeleteNode, DeleteOutcome, PendingDelete,
    RefreshReport, RenameNode, RenameOutcome, StartupReport,
};

/// Outcome of asking the user for a folder to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The user cancelled the dialog.
    Cancelled,
    /// The folder is now an open collection.
    Opened(CollectionRef),
}

/// What closing a collection changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseSummary {
    /// The closed collection.
    pub collection: CollectionRef,
    /// Expanded paths removed with it.
    pub collapsed: usize,
    /// True if the active file belonged to it and was cleared.
    pub cleared_active_file: bool,
    /// How the selection was settled afterwards.
    pub selection: SelectionResolution,
}

/// The open workspace.
pub struct Workspace<S, Q, W> {
    store: WorkspaceStore<W>,
    events: EventCoordinator,
    loader: CollectionLoader<S>,
    create: CreateNode<S, Q>,
    rename: RenameNode<S>,
    delete: DeleteNode<S>,
}

impl<S, Q, W> Workspace<S, Q, W>
where
    S: Storage + Clone,
    Q: RequestRepository,
    W: WorkspaceStateRepository,
{
    /// Loads persisted state and restores every collection that still loads.
    ///
    /// Failed collections are dropped and reported once in the returned
    /// [`StartupReport`] and their expanded paths are pruned; restored roots
    /// are expanded.
    pub async fn open(
        storage: S,
        requests: Q,
        state_repository: W,
        clock: Arc<dyn Clock>,
    ) -> (Self, StartupReport, Reconciliation) {
        let mut workspace = Self {
            store: WorkspaceStore::load(state_repository).await,
            events: EventCoordinator::new(),
            loader: CollectionLoader::new(storage.clone()),
            create: CreateNode::new(storage.clone(), requests, clock),
            rename: RenameNode::new(storage.clone()),
            delete: DeleteNode::new(storage),
        };

        let pending = workspace.store.take_pending_restore();
        let report = workspace.loader.restore(pending).await;
        for failed in &report.failed {
            let pruned = workspace.store.remove_expanded_under(&failed.reference.path);
            debug!(path = %failed.reference.path.display(), pruned, "dropped expansion of unloadable collection");
        }
        for collection in &report.loaded {
            workspace.store.expand(collection.path.clone());
            workspace.store.add_collection(collection.clone());
        }
        let reconciliation = workspace.store.reconcile();
        info!(
            collections = workspace.store.collections().len(),
            failed = report.failed.len(),
            "workspace restored"
        );
        workspace.persist().await;
        (workspace, report, reconciliation)
    }

    /// Returns the store.
    #[must_use]
    pub const fn store(&self) -> &WorkspaceStore<W> {
        &self.store
    }

    /// Returns the store for direct edits; call [`flush`](Self::flush) after.
    pub const fn store_mut(&mut self) -> &mut WorkspaceStore<W> {
        &mut self.store
    }

    /// Returns the event coordinator for subscribing views.
    pub const fn events_mut(&mut self) -> &mut EventCoordinator {
        &mut self.events
    }

    /// Returns the store and the event coordinator together.
    pub const fn parts_mut(&mut self) -> (&mut WorkspaceStore<W>, &mut EventCoordinator) {
        (&mut self.store, &mut self.events)
    }

    /// Writes pending state changes; failures are logged and retried later.
    pub async fn flush(&mut self) {
        self.persist().await;
    }

    /// Asks the user for a folder and opens it.
    ///
    /// # Errors
    ///
    /// See [`open_collection_at`](Self::open_collection_at).
    pub async fn open_collection<P: FolderPicker>(&mut self, picker: &P) -> ApplicationResult<OpenOutcome> {
        match picker.pick_folder().await {
            None => Ok(OpenOutcome::Cancelled),
            Some(path) => self.open_collection_at(&path).await.map(OpenOutcome::Opened),
        }
    }

    /// Opens `root` as a new collection, expands it and selects it if nothing
    /// was selected.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::CollectionAlreadyOpen`] for a duplicate
    /// root, or the load error.
    pub async fn open_collection_at(&mut self, root: &Path) -> ApplicationResult<CollectionRef> {
        if self.store.is_open(root) {
            return Err(ApplicationError::CollectionAlreadyOpen(root.to_path_buf()));
        }
        let collection = self.loader.open(root).await?;
        let reference = collection.to_ref();
        self.store.expand(collection.path.clone());
        self.store.add_collection(collection);
        if self.store.selected_collection().is_none() {
            self.store.select_collection(&reference.id)?;
        }
        info!(id = %reference.id, path = %root.display(), "collection opened");
        self.persist().await;
        Ok(reference)
    }

    /// Closes a collection and drops the session state that belonged to it.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::UnknownCollection`] for an unknown id.
    pub async fn close_collection(&mut self, id: &str) -> ApplicationResult<CloseSummary> {
        let collection = self
            .store
            .remove_collection(id)
            .ok_or_else(|| ApplicationError::UnknownCollection(id.to_string()))?;

        let collapsed = self.store.remove_expanded_under(&collection.path);
        let cleared_active_file = self
            .store
            .active_file()
            .is_some_and(|active| collection.contains_path(active));
        if cleared_active_file {
            self.store.set_active_file(None);
            self.events.notify_clear_active();
        }
        if self.store.selected_collection_id() == Some(id) {
            self.store.clear_selection();
        }
        let selection = self.store.reconcile().selection;

        info!(id, collapsed, cleared_active_file, "collection closed");
        self.persist().await;
        Ok(CloseSummary {
            collection: collection.to_ref(),
            collapsed,
            cleared_active_file,
            selection,
        })
    }

    /// Selects a collection for context.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::UnknownCollection`] for an unknown id.
    pub async fn select_collection(&mut self, id: &str) -> ApplicationResult<()> {
        self.store.select_collection(id)?;
        self.persist().await;
        Ok(())
    }

    /// A click on a collection root: select it and clear the editor.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::UnknownCollection`] for an unknown id.
    pub async fn click_collection(&mut self, id: &str) -> ApplicationResult<()> {
        self.store.select_collection(id)?;
        self.events.notify_clear_active();
        self.persist().await;
        Ok(())
    }

    /// A click on a file: select its collection, make it active and ask
    /// document views to load it.
    ///
    /// Files that are not request files only select their collection.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::NodeNotFound`] if no collection owns it.
    pub async fn click_file(&mut self, path: &Path) -> ApplicationResult<()> {
        self.select_owner(path)?;
        if !is_request_file(path) {
            debug!(path = %path.display(), "not a request file; editor left as is");
            self.persist().await;
            return Ok(());
        }
        self.store.set_active_file(Some(path.to_path_buf()));
        self.events.notify_load_file(path);
        self.persist().await;
        Ok(())
    }

    /// A click on a directory: select its collection, toggle expansion and
    /// clear the editor. Returns the new expansion state.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::NodeNotFound`] if no collection owns it.
    pub async fn click_directory(&mut self, path: &Path) -> ApplicationResult<bool> {
        self.select_owner(path)?;
        let expanded = self.store.toggle_expanded(path);
        self.store.set_active_file(None);
        self.events.notify_clear_active();
        self.persist().await;
        Ok(expanded)
    }

    /// Creates a file or directory under `parent`.
    ///
    /// The parent is expanded and every collection refreshed afterwards, so
    /// nested roots see the new node too.
    ///
    /// # Errors
    ///
    /// Returns the use case error; nothing is written on a name conflict.
    pub async fn create_node(
        &mut self,
        parent: &Path,
        kind: NodeKind,
        name: &str,
    ) -> ApplicationResult<PathBuf> {
        let id = self.select_owner(parent)?;
        let input = CreateNodeInput {
            parent: parent.to_path_buf(),
            kind,
            name: name.to_string(),
        };
        let result = self.create.execute(self.snapshot(&id)?, input).await;
        let path = match result {
            Ok(path) => path,
            Err(err) => {
                self.persist().await;
                return Err(err);
            }
        };
        self.store.expand(parent);
        self.loader.refresh_all(&mut self.store).await;
        self.persist().await;
        Ok(path)
    }

    /// Renames a node in place. Its kind is taken from the tree.
    ///
    /// Expanded paths and the active file follow the move and document views
    /// receive a `Relocated` event. All collections are refreshed, including
    /// after a partial rename.
    ///
    /// # Errors
    ///
    /// Returns the use case error.
    pub async fn rename_node(&mut self, path: &Path, new_name: &str) -> ApplicationResult<RenameOutcome> {
        let id = self.select_owner(path)?;
        let snapshot = self.snapshot(&id)?;
        let kind = snapshot
            .node(path)
            .map(|node| NodeKind::of(&node.entry))
            .ok_or_else(|| ApplicationError::NodeNotFound(path.to_path_buf()))?;

        let result = self.rename.execute(snapshot, path, kind, new_name).await;
        match &result {
            Ok(RenameOutcome::Renamed { from, to }) => {
                self.store.relocate_paths(from, to);
                self.events.notify_relocated(from.clone(), to.clone());
                self.loader.refresh_all(&mut self.store).await;
            }
            Err(ApplicationError::PartialRename { .. }) => {
                self.loader.refresh_all(&mut self.store).await;
            }
            _ => {}
        }
        self.persist().await;
        result
    }

    /// Deletes a node, or returns the pending delete of a non-empty directory
    /// for [`confirm_delete`](Self::confirm_delete).
    ///
    /// # Errors
    ///
    /// Returns the use case error.
    pub async fn delete_node(&mut self, path: &Path) -> ApplicationResult<DeleteOutcome> {
        let id = self.select_owner(path)?;
        let outcome = self.delete.execute(self.snapshot(&id)?, path).await;
        if let Ok(DeleteOutcome::Deleted(deleted)) = &outcome {
            self.after_delete(deleted).await;
        }
        self.persist().await;
        outcome
    }

    /// Performs a delete the user confirmed.
    ///
    /// # Errors
    ///
    /// Returns the storage error.
    pub async fn confirm_delete(&mut self, pending: PendingDelete) -> ApplicationResult<PathBuf> {
        self.select_owner(&pending.path)?;
        let deleted = self.delete.confirm(pending).await?;
        self.after_delete(&deleted).await;
        self.persist().await;
        Ok(deleted)
    }

    /// Refreshes every open collection in turn.
    pub async fn refresh_all(&mut self) -> RefreshReport {
        self.loader.refresh_all(&mut self.store).await
    }

    /// Refreshes the collection owning `path`, e.g. after a save-as.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::NodeNotFound`] if no collection owns it,
    /// or the load error.
    pub async fn refresh_owner(&mut self, path: &Path) -> ApplicationResult<()> {
        let id = self
            .store
            .owner_of(path)
            .map(|c| c.id.clone())
            .ok_or_else(|| ApplicationError::NodeNotFound(path.to_path_buf()))?;
        self.loader.refresh(&mut self.store, &id).await
    }

    /// Sets the autosave preference.
    pub async fn set_autosave(&mut self, enabled: bool) {
        self.store.set_autosave(enabled);
        self.persist().await;
    }

    fn select_owner(&mut self, path: &Path) -> ApplicationResult<String> {
        let id = self
            .store
            .owner_of(path)
            .map(|c| c.id.clone())
            .ok_or_else(|| ApplicationError::NodeNotFound(path.to_path_buf()))?;
        self.store.select_collection(&id)?;
        Ok(id)
    }

    fn snapshot(&self, id: &str) -> ApplicationResult<&TreeSnapshot> {
        self.store
            .collection(id)
            .map(parcel_domain::Collection::snapshot)
            .ok_or_else(|| ApplicationError::UnknownCollection(id.to_string()))
    }

    async fn after_delete(&mut self, deleted: &Path) {
        let active_removed = self
            .store
            .active_file()
            .is_some_and(|active| active.starts_with(deleted));
        if active_removed {
            self.store.set_active_file(None);
            self.events.notify_clear_active();
        }
        self.store.remove_expanded_under(deleted);
        self.loader.refresh_all(&mut self.store).await;
    }

    async fn persist(&mut self) {
        if let Err(err) = self.store.flush().await {
            warn!(error = %err, "workspace state not saved; will retry");
        }
    }
}
