//! Workspace state file (`workspace.json`).

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::CURRENT_SCHEMA_VERSION;
use crate::collection::CollectionRef;

/// Session state that survives process restarts.
///
/// Tree snapshots are not part of it; collections are stored as references
/// and re-validated against storage at startup.
///
/// Fields are ordered alphabetically for deterministic serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceState {
    /// Path of the request file last being edited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_file: Option<PathBuf>,

    /// Persist the document right after each successful send.
    #[serde(default = "default_autosave")]
    pub autosave: bool,

    /// Open collections, in the order they were opened.
    #[serde(default)]
    pub collections: Vec<CollectionRef>,

    /// Directory paths shown expanded in the tree.
    #[serde(default)]
    pub expanded_nodes: BTreeSet<PathBuf>,

    /// Schema version for migration support.
    pub schema_version: u32,

    /// Id of the collection used for context (save-as target, etc.).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_collection: Option<String>,
}

const fn default_autosave() -> bool {
    true
}

impl Default for WorkspaceState {
    fn default() -> Self {
        Self {
            active_file: None,
            autosave: default_autosave(),
            collections: Vec::new(),
            expanded_nodes: BTreeSet::new(),
            schema_version: CURRENT_SCHEMA_VERSION,
            selected_collection: None,
        }
    }
}
