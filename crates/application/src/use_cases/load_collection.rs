//! Collection tree loader.

use std::path::Path;

use parcel_domain::{Collection, CollectionRef, TreeSnapshot, generate_id};
use tracing::{info, warn};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{Storage, WorkspaceStateRepository};
use crate::store::WorkspaceStore;

/// A persisted collection that could not be restored.
#[derive(Debug)]
pub struct FailedCollection {
    /// The persisted reference.
    pub reference: CollectionRef,
    /// Why loading failed.
    pub error: ApplicationError,
}

/// Result of restoring persisted collections at startup.
#[derive(Debug, Default)]
pub struct StartupReport {
    /// Collections that loaded.
    pub loaded: Vec<Collection>,
    /// Collections dropped from the workspace.
    pub failed: Vec<FailedCollection>,
}

impl StartupReport {
    /// One aggregate notice naming every collection that failed, if any.
    #[must_use]
    pub fn notice(&self) -> Option<String> {
        if self.failed.is_empty() {
            return None;
        }
        let names: Vec<&str> = self
            .failed
            .iter()
            .map(|f| f.reference.name.as_str())
            .collect();
        Some(format!(
            "The following collections could not be loaded and were removed: {}",
            names.join(", ")
        ))
    }
}

/// Result of refreshing every open collection.
#[derive(Debug, Default)]
pub struct RefreshReport {
    /// Number of collections whose snapshot was replaced.
    pub refreshed: usize,
    /// Collections that kept their previous snapshot, by id.
    pub failed: Vec<(String, ApplicationError)>,
}

/// Builds and refreshes tree snapshots through the storage port.
#[derive(Debug, Clone)]
pub struct CollectionLoader<S> {
    storage: S,
}

impl<S: Storage> CollectionLoader<S> {
    /// Creates a new loader.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Reads the tree under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::StorageUnavailable`] if the root is missing
    /// or inaccessible.
    pub async fn load(&self, root: &Path) -> ApplicationResult<TreeSnapshot> {
        let tree = self.storage.get_directory_tree(root).await?;
        let snapshot = TreeSnapshot::new(tree);
        info!(root = %root.display(), nodes = snapshot.len(), "collection tree loaded");
        Ok(snapshot)
    }

    /// Loads a newly picked folder as a collection with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be read.
    pub async fn open(&self, root: &Path) -> ApplicationResult<Collection> {
        let snapshot = self.load(root).await?;
        Ok(Collection::new(generate_id(), snapshot))
    }

    /// Loads every persisted reference; failures are collected, not raised.
    pub async fn restore(&self, references: Vec<CollectionRef>) -> StartupReport {
        let mut report = StartupReport::default();
        for reference in references {
            match self.load(&reference.path).await {
                Ok(snapshot) => report.loaded.push(Collection::from_ref(reference, snapshot)),
                Err(error) => {
                    warn!(
                        name = %reference.name,
                        path = %reference.path.display(),
                        %error,
                        "collection could not be restored"
                    );
                    report.failed.push(FailedCollection { reference, error });
                }
            }
        }
        report
    }

    /// Replaces the snapshot of one open collection.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::UnknownCollection`] for an unknown id, or
    /// the load error; the previous snapshot is kept on failure.
    pub async fn refresh<W: WorkspaceStateRepository>(
        &self,
        store: &mut WorkspaceStore<W>,
        id: &str,
    ) -> ApplicationResult<()> {
        let root = store
            .collection(id)
            .map(|c| c.path.clone())
            .ok_or_else(|| ApplicationError::UnknownCollection(id.to_string()))?;
        let snapshot = self.load(&root).await?;
        if let Some(collection) = store.collection_mut(id) {
            collection.replace_snapshot(snapshot);
        }
        Ok(())
    }

    /// Refreshes every open collection, one after another.
    pub async fn refresh_all<W: WorkspaceStateRepository>(
        &self,
        store: &mut WorkspaceStore<W>,
    ) -> RefreshReport {
        let ids: Vec<String> = store.collections().iter().map(|c| c.id.clone()).collect();
        let mut report = RefreshReport::default();
        for id in ids {
            match self.refresh(store, &id).await {
                Ok(()) => report.refreshed += 1,
                Err(error) => {
                    warn!(%id, %error, "collection refresh failed");
                    report.failed.push((id, error));
                }
            }
        }
        report
    }
}
