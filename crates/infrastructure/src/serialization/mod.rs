//! Deterministic JSON serialization for Parcel files.
//!
//! Request files and the workspace state are meant to live in version
//! control, so output is stable:
//! - Struct fields declared alphabetically, `BTreeMap`/`BTreeSet` for maps
//! - 2-space indentation
//! - Trailing newline

mod json;

pub use json::*;
