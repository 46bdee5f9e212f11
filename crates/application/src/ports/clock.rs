//! Clock port

use chrono::{DateTime, Utc};

/// Source of the timestamps written into request documents.
///
/// Tests substitute a fixed clock so documents compare deterministically.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}
