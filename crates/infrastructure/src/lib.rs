//! Parcel Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: local disk storage, JSON request
//! and workspace-state files, a reqwest HTTP executor and the system
//! clock, plus environment-driven configuration.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod serialization;

pub use adapters::{ReqwestExecutor, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use persistence::{FileRequestRepository, FileWorkspaceStateRepository, LocalStorage};
pub use serialization::{
    SerializationError, from_json, from_json_bytes, to_json_stable, to_json_stable_bytes,
};
