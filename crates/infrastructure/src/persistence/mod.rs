//! File-backed persistence adapters.

mod local_storage;
mod request_repository;
mod state_repository;

pub use local_storage::LocalStorage;
pub use request_repository::FileRequestRepository;
pub use state_repository::FileWorkspaceStateRepository;
