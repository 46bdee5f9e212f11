//! Parcel Domain - Core workspace types
//!
//! This crate defines the domain model for the Parcel request workspace:
//! mirrored directory trees, collections, request documents and responses.
//! All types here are pure Rust with no I/O dependencies.

pub mod collection;
pub mod error;
pub mod id;
pub mod persistence;
pub mod request;
pub mod response;
pub mod state;
pub mod tree;

pub use collection::{Collection, CollectionRef};
pub use error::{DomainError, DomainResult};
pub use id::generate_id;
pub use persistence::WorkspaceState;
pub use request::{BodyType, HttpMethod, KeyValue, RequestDocument};
pub use response::{HttpResponse, ResponseCookie};
pub use state::{RequestErrorKind, RequestState};
pub use tree::{DirectoryTree, FileSystemEntry, IndexedNode, NodeKind, TreeSnapshot};
