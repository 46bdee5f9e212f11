//! Workspace state repository port.

use std::future::Future;

use parcel_domain::WorkspaceState;

/// Error type for workspace state persistence.
#[derive(Debug, thiserror::Error)]
pub enum StateStoreError {
    /// The state file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The state file does not decode.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The state file was written by a newer version.
    #[error("unsupported schema version {found} (supported: {supported})")]
    UnsupportedSchema {
        /// Version found in the file.
        found: u32,
        /// Highest version this build reads.
        supported: u32,
    },
}

/// Loads and saves the session state that survives restarts.
pub trait WorkspaceStateRepository: Send + Sync {
    /// Loads the persisted state. A missing file yields the default state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state exists but cannot be read or decoded.
    fn load(&self) -> impl Future<Output = Result<WorkspaceState, StateStoreError>> + Send;

    /// Persists the state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    fn save(&self, state: &WorkspaceState)
    -> impl Future<Output = Result<(), StateStoreError>> + Send;
}
