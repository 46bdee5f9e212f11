//! Request execution state of the document editor.
//!
//! Drives the loading indicator: a send moves the editor to `Loading`, the
//! outcome moves it to `Success` or `Error`.

use serde::{Deserialize, Serialize};

use crate::response::HttpResponse;

/// Current state of the request being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RequestState {
    /// Nothing sent since the document was loaded or cleared.
    #[default]
    Idle,

    /// Request is in flight.
    Loading {
        /// When the request started. Not serialized.
        #[serde(skip)]
        started_at: Option<std::time::Instant>,
    },

    /// Response received.
    Success {
        /// The response data.
        response: Box<HttpResponse>,
    },

    /// The send failed before a response arrived.
    Error {
        /// Error category.
        kind: RequestErrorKind,
        /// Human-readable message.
        message: String,
    },
}

impl RequestState {
    /// Creates a `Loading` state stamped with the current instant.
    #[must_use]
    pub fn loading() -> Self {
        Self::Loading {
            started_at: Some(std::time::Instant::now()),
        }
    }

    /// Creates a `Success` state.
    #[must_use]
    pub fn success(response: HttpResponse) -> Self {
        Self::Success {
            response: Box::new(response),
        }
    }

    /// Creates an `Error` state.
    #[must_use]
    pub fn error(kind: RequestErrorKind, message: impl Into<String>) -> Self {
        Self::Error {
            kind,
            message: message.into(),
        }
    }

    /// Returns true while a request is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// Returns true if the last send failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Returns the response if the last send succeeded.
    #[must_use]
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Self::Success { response } => Some(response),
            _ => None,
        }
    }

    /// Returns the elapsed time while loading.
    #[must_use]
    pub fn elapsed(&self) -> Option<std::time::Duration> {
        match self {
            Self::Loading {
                started_at: Some(t),
            } => Some(t.elapsed()),
            _ => None,
        }
    }
}

/// Categories of send failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestErrorKind {
    /// The URL is empty or malformed.
    InvalidUrl,
    /// The server could not be reached.
    ConnectionFailed,
    /// No response within the configured timeout.
    Timeout,
    /// The response body could not be read.
    BodyRead,
    /// Anything else.
    Unknown,
}

impl RequestErrorKind {
    /// Returns a short title for notices.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::InvalidUrl => "Invalid URL",
            Self::ConnectionFailed => "Connection Failed",
            Self::Timeout => "Request Timeout",
            Self::BodyRead => "Unreadable Response",
            Self::Unknown => "Request Error",
        }
    }
}
