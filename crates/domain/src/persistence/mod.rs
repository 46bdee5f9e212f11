//! Persisted forms of workspace state.

mod workspace;

pub use workspace::WorkspaceState;

/// Current schema version of the persisted workspace state.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;
