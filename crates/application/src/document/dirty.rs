//! Dirty comparator.

use parcel_domain::RequestDocument;
use parcel_domain::request::pairs;

/// Returns true when `current` differs from `persisted` in anything a save
/// would change.
///
/// Both documents are expected to be normalized. Scalars are compared
/// directly; headers and query rows are compared after sorting by
/// `(key, value)`, so reordering rows alone never makes a document dirty.
#[must_use]
pub fn is_dirty(persisted: &RequestDocument, current: &RequestDocument) -> bool {
    persisted.method != current.method
        || persisted.url != current.url
        || persisted.body != current.body
        || persisted.body_type != current.body_type
        || persisted.response != current.response
        || !pairs::same_content(&persisted.headers, &current.headers)
        || !pairs::same_content(&persisted.query, &current.query)
}
