//! Request document editing: the controller, its editable fields and the
//! dirty comparator.

mod controller;
mod dirty;

pub use controller::{RequestDocumentController, SendOutcome};
pub use dirty::is_dirty;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parcel_domain::{BodyType, HttpMethod, HttpResponse, KeyValue, RequestDocument};

/// Whether the editor is bound to a request file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing attached; fields hold defaults and the editor is clean.
    #[default]
    Unattached,
    /// Fields were loaded from, and are compared against, this file.
    Attached(PathBuf),
}

impl LoadState {
    /// Returns the attached path.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Unattached => None,
            Self::Attached(path) => Some(path),
        }
    }
}

/// Which row list an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowList {
    /// Header rows.
    Headers,
    /// Query parameter rows.
    Query,
}

/// The user-editable fields of a request.
///
/// Rows are kept exactly as typed, blank ones included; write rules are
/// applied when a document is built from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditableRequest {
    /// Body buffer.
    pub body: String,
    /// How the body is interpreted.
    pub body_type: BodyType,
    /// Header rows.
    pub headers: Vec<KeyValue>,
    /// HTTP method.
    pub method: HttpMethod,
    /// Query rows.
    pub query: Vec<KeyValue>,
    /// Response shown in the response panel.
    pub response: Option<HttpResponse>,
    /// Target URL.
    pub url: String,
}

impl EditableRequest {
    /// Populates the fields from a persisted document.
    #[must_use]
    pub fn from_document(document: &RequestDocument) -> Self {
        Self {
            body: document.body.clone(),
            body_type: document.body_type,
            headers: document.headers.clone(),
            method: document.method,
            query: document.query.clone(),
            response: document.response.clone(),
            url: document.url.clone(),
        }
    }

    /// Builds the document that a save would write.
    ///
    /// `base` supplies fields the editor does not own (creation time and
    /// description); without one the document is treated as new.
    #[must_use]
    pub fn to_document(&self, base: Option<&RequestDocument>, now: DateTime<Utc>) -> RequestDocument {
        RequestDocument {
            body: self.body.clone(),
            body_type: self.body_type,
            created_at: base.map_or(now, |b| b.created_at),
            description: base.map(|b| b.description.clone()).unwrap_or_default(),
            headers: self.headers.clone(),
            method: self.method,
            name: RequestDocument::default_name(self.method, &self.url),
            query: self.query.clone(),
            response: self.response.clone(),
            updated_at: now,
            url: self.url.clone(),
        }
        .normalized()
    }

    fn rows_mut(&mut self, list: RowList) -> &mut Vec<KeyValue> {
        match list {
            RowList::Headers => &mut self.headers,
            RowList::Query => &mut self.query,
        }
    }
}
