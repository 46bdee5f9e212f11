//! Application error types

use std::path::PathBuf;

use parcel_domain::DomainError;
use thiserror::Error;

use crate::ports::{HttpExecutionError, StateStoreError, StorageError};

/// Errors surfaced by workspace operations.
///
/// User-initiated failures are reported as a dismissable notice; none of
/// them end the session.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A path is missing or inaccessible.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// A create or rename target collides with an existing sibling.
    #[error("\"{name}\" already exists in {}", parent.display())]
    NameConflict {
        /// Directory holding the conflicting sibling.
        parent: PathBuf,
        /// The colliding final name.
        name: String,
    },

    /// Save-as or autosave needs a selected collection.
    #[error("no collection selected")]
    NoCollectionSelected,

    /// Save needs an attached request file.
    #[error("no active file")]
    NoActiveFile,

    /// The HTTP execution collaborator failed.
    #[error("request failed: {0}")]
    RequestExecutionFailure(#[from] HttpExecutionError),

    /// A rename copied the node but the original could not be removed.
    #[error("renamed to {} but {} could not be removed", new.display(), old.display())]
    PartialRename {
        /// Path that still exists.
        old: PathBuf,
        /// Path that was created.
        new: PathBuf,
    },

    /// The folder is already open as a collection.
    #[error("collection already open: {}", .0.display())]
    CollectionAlreadyOpen(PathBuf),

    /// No open collection has this id.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    /// The path is not part of any open collection tree.
    #[error("not found in workspace: {}", .0.display())]
    NodeNotFound(PathBuf),

    /// A domain validation error occurred.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Workspace state could not be read or written.
    #[error("workspace state: {0}")]
    StatePersistence(#[from] StateStoreError),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
