//! Application use cases (business logic orchestration).

mod create_node;
mod delete_node;
mod execute_request;
mod load_collection;
mod rename_node;

pub use create_node::*;
pub use delete_node::*;
pub use execute_request::*;
pub use load_collection::*;
pub use rename_node::*;

use std::path::Path;

use parcel_domain::{DomainError, TreeSnapshot};

use crate::error::{ApplicationError, ApplicationResult};

/// Rejects operations aimed at the collection root itself.
fn ensure_not_root(snapshot: &TreeSnapshot, path: &Path) -> ApplicationResult<()> {
    if snapshot.root() == path {
        return Err(ApplicationError::Domain(DomainError::InvalidPath(format!(
            "{} is a collection root; close the collection instead",
            path.display()
        ))));
    }
    Ok(())
}
