//! The persisted request document.
//!
//! One request file holds exactly one serialized [`RequestDocument`]. The
//! [`REQUEST_FILE_EXTENSION`] distinguishes request files from other entries.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::body::BodyType;
use super::method::HttpMethod;
use super::pairs::{self, KeyValue};
use crate::response::HttpResponse;

/// File extension of request files, without the dot.
pub const REQUEST_FILE_EXTENSION: &str = "parcel";

/// A saved HTTP request, optionally with the last response it produced.
///
/// Fields are declared alphabetically for deterministic serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDocument {
    /// Body buffer. Empty on disk whenever `body_type` is none.
    #[serde(default)]
    pub body: String,
    /// How the body is interpreted.
    #[serde(default)]
    pub body_type: BodyType,
    /// When the document was first written.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Header rows.
    #[serde(default, deserialize_with = "pairs::deserialize")]
    pub headers: Vec<KeyValue>,
    /// HTTP method.
    #[serde(default)]
    pub method: HttpMethod,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Query parameter rows.
    #[serde(default, deserialize_with = "pairs::deserialize")]
    pub query: Vec<KeyValue>,
    /// Last response, embedded when saved after a send.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<HttpResponse>,
    /// When the document was last written.
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    /// Target URL.
    #[serde(default)]
    pub url: String,
}

impl RequestDocument {
    /// Content of a freshly created request file: `GET`, everything empty.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            body: String::new(),
            body_type: BodyType::None,
            created_at: now,
            description: String::new(),
            headers: Vec::new(),
            method: HttpMethod::Get,
            name: String::new(),
            query: Vec::new(),
            response: None,
            updated_at: now,
            url: String::new(),
        }
    }

    /// Applies the write rules: incomplete rows are dropped, the inferred
    /// `Content-Type` replaces any existing one, and the body is blanked when
    /// the body type is none.
    ///
    /// The replacement matches the header name ignoring case, so a
    /// `Content-Type` row typed by the user only survives while the body type
    /// is none; with a body type set, documents differing only in that row
    /// normalize equal.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.headers = pairs::complete(&self.headers);
        self.query = pairs::complete(&self.query);
        if let Some(content_type) = self.body_type.content_type() {
            pairs::set(&mut self.headers, "Content-Type", content_type);
        }
        if !self.body_type.carries_body() {
            self.body.clear();
        }
        self
    }

    /// Name given to a document on save: `METHOD@host/path`.
    #[must_use]
    pub fn default_name(method: HttpMethod, url: &str) -> String {
        let bare = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .unwrap_or(url);
        format!("{method}@{bare}")
    }
}

/// Appends the request extension to a base name.
#[must_use]
pub fn request_file_name(base: &str) -> String {
    format!("{base}.{REQUEST_FILE_EXTENSION}")
}

/// Appends the request extension unless the name already carries it.
#[must_use]
pub fn ensure_request_extension(name: &str) -> String {
    if is_request_file(Path::new(name)) {
        name.to_string()
    } else {
        request_file_name(name)
    }
}

/// Strips a trailing request extension, if any.
#[must_use]
pub fn request_base_name(name: &str) -> &str {
    name.strip_suffix(REQUEST_FILE_EXTENSION)
        .and_then(|rest| rest.strip_suffix('.'))
        .filter(|base| !base.is_empty())
        .unwrap_or(name)
}

/// Returns true if the path names a request file.
#[must_use]
pub fn is_request_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == REQUEST_FILE_EXTENSION)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_new_document_defaults() {
        let doc = RequestDocument::new(now());
        assert_eq!(doc.method, HttpMethod::Get);
        assert_eq!(doc.body_type, BodyType::None);
        assert!(doc.url.is_empty());
        assert!(doc.body.is_empty());
        assert!(doc.headers.is_empty());
        assert_eq!(doc.created_at, doc.updated_at);
    }

    #[test]
    fn test_normalized_applies_write_rules() {
        let mut doc = RequestDocument::new(now());
        doc.body_type = BodyType::Json;
        doc.body = "{}".to_string();
        doc.headers = vec![
            KeyValue::new("content-type", "text/plain"),
            KeyValue::new("", "orphan"),
        ];
        doc.query = vec![KeyValue::new("page", "")];

        let doc = doc.normalized();
        assert_eq!(doc.headers, vec![KeyValue::new("Content-Type", "application/json")]);
        assert!(doc.query.is_empty());
        assert_eq!(doc.body, "{}");
    }

    #[test]
    fn test_user_content_type_kept_only_without_body_type() {
        let mut doc = RequestDocument::new(now());
        doc.headers = vec![KeyValue::new("Content-Type", "text/csv")];
        assert_eq!(doc.clone().normalized().headers, doc.headers);

        let mut edited = doc.clone();
        doc.body_type = BodyType::Xml;
        edited.body_type = BodyType::Xml;
        edited.headers = vec![KeyValue::new("Content-Type", "application/xml; charset=utf-8")];
        assert_eq!(doc.normalized().headers, edited.normalized().headers);
    }

    #[test]
    fn test_normalized_blanks_body_without_body_type() {
        let mut doc = RequestDocument::new(now());
        doc.body = "leftover".to_string();
        let doc = doc.normalized();
        assert!(doc.body.is_empty());
        assert!(doc.headers.is_empty());
    }

    #[test]
    fn test_default_name_strips_scheme() {
        assert_eq!(
            RequestDocument::default_name(HttpMethod::Post, "https://api.test/users"),
            "POST@api.test/users"
        );
        assert_eq!(RequestDocument::default_name(HttpMethod::Get, ""), "GET@");
    }

    #[test]
    fn test_file_name_helpers() {
        assert_eq!(request_file_name("list"), "list.parcel");
        assert_eq!(ensure_request_extension("list"), "list.parcel");
        assert_eq!(ensure_request_extension("list.parcel"), "list.parcel");
        assert_eq!(request_base_name("list.parcel"), "list");
        assert_eq!(request_base_name("list"), "list");
        assert_eq!(request_base_name(".parcel"), ".parcel");
        assert!(is_request_file(Path::new("/ws/api/list.parcel")));
        assert!(!is_request_file(Path::new("/ws/api/notes.txt")));
    }

    #[test]
    fn test_reads_object_headers_and_missing_fields() {
        let json = r#"{
            "name": "legacy",
            "method": "PUT",
            "url": "http://x.test",
            "headers": {"Accept": "*/*"},
            "query": null,
            "body": "",
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-02T00:00:00Z"
        }"#;
        let doc: RequestDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.method, HttpMethod::Put);
        assert_eq!(doc.headers, vec![KeyValue::new("Accept", "*/*")]);
        assert!(doc.query.is_empty());
        assert_eq!(doc.body_type, BodyType::None);
        assert!(doc.response.is_none());
    }
}
