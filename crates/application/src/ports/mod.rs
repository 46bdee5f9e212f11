//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod folder_picker;
mod http_executor;
mod request_repository;
mod state_repository;
mod storage;

pub use clock::Clock;
pub use folder_picker::FolderPicker;
pub use http_executor::{ExecutionRequest, HttpExecutionError, HttpExecutor};
pub use request_repository::RequestRepository;
pub use state_repository::{StateStoreError, WorkspaceStateRepository};
pub use storage::{Storage, StorageError};
