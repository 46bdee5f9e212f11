//! Workspace state persistence.
//!
//! The state lives in the platform config directory by default:
//! - Linux: ~/.config/parcel/workspace.json
//! - macOS: ~/Library/Application Support/parcel/workspace.json
//! - Windows: %APPDATA%/parcel/workspace.json

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parcel_application::ports::{StateStoreError, WorkspaceStateRepository};
use parcel_domain::WorkspaceState;
use parcel_domain::persistence::CURRENT_SCHEMA_VERSION;
use tokio::fs;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

const APP_DIR: &str = "parcel";
const STATE_FILE: &str = "workspace.json";

/// Stores [`WorkspaceState`] as a single JSON file.
#[derive(Debug, Clone)]
pub struct FileWorkspaceStateRepository {
    path: PathBuf,
}

impl FileWorkspaceStateRepository {
    /// Creates a repository for the state file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default state file location, or `None` if the platform has no
    /// config directory.
    #[must_use]
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(STATE_FILE))
    }

    /// Path of the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkspaceStateRepository for FileWorkspaceStateRepository {
    async fn load(&self) -> Result<WorkspaceState, StateStoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No workspace state yet");
                return Ok(WorkspaceState::default());
            }
            Err(e) => return Err(e.into()),
        };

        let state: WorkspaceState =
            from_json_bytes(&bytes).map_err(|e| StateStoreError::Serialization(e.to_string()))?;

        if state.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(StateStoreError::UnsupportedSchema {
                found: state.schema_version,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }

        Ok(state)
    }

    async fn save(&self, state: &WorkspaceState) -> Result<(), StateStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let bytes =
            to_json_stable_bytes(state).map_err(|e| StateStoreError::Serialization(e.to_string()))?;
        fs::write(&self.path, bytes).await?;

        tracing::debug!(path = %self.path.display(), "Workspace state written");
        Ok(())
    }
}
