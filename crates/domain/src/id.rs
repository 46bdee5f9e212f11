//! ID generation utilities.

use uuid::Uuid;

/// Generates a new time-ordered UUID v7 as a string.
///
/// Collection ids are generated client-side when a folder is opened and are
/// only meaningful within the persisted workspace state.
#[must_use]
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}
