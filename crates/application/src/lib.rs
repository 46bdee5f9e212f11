//! Parcel Application - Use cases and ports
//!
//! This crate contains the workspace synchronization engine: the workspace
//! store, the collection tree loader, tree mutations, the event coordinator
//! and the request document controller. External systems are reached only
//! through the traits in [`ports`].

pub mod document;
pub mod error;
pub mod events;
pub mod ports;
pub mod store;
pub mod use_cases;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;

pub use document::{
    EditableRequest, LoadState, RequestDocumentController, RowList, SendOutcome, is_dirty,
};
pub use error::{ApplicationError, ApplicationResult};
pub use events::{EventCoordinator, Subscription, SubscriptionId, WorkspaceEvent};
pub use store::{Reconciliation, SelectionResolution, WorkspaceStore};
pub use workspace::{CloseSummary, OpenOutcome, Workspace};
