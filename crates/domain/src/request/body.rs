//! Request body kinds

use serde::{Deserialize, Serialize};

/// How the body buffer of a request is interpreted.
///
/// With [`BodyType::None`] the buffer is never sent nor persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    /// No body
    #[default]
    None,
    /// JSON document
    Json,
    /// Plain text
    Text,
    /// XML document
    Xml,
    /// SPARQL query
    Sparql,
}

impl BodyType {
    /// Returns the `Content-Type` inferred for this body kind.
    #[must_use]
    pub const fn content_type(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Json => Some("application/json"),
            Self::Text => Some("text/plain"),
            Self::Xml => Some("application/xml"),
            Self::Sparql => Some("application/sparql-query"),
        }
    }

    /// Returns true when a body is transmitted for this kind.
    #[must_use]
    pub const fn carries_body(self) -> bool {
        !matches!(self, Self::None)
    }
}
