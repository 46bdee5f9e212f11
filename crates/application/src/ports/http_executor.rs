//! HTTP execution port

use std::collections::BTreeMap;
use std::future::Future;

use parcel_domain::{HttpMethod, HttpResponse, RequestErrorKind};

/// What the execution engine receives: single-valued headers and query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Target URL, without the query rows below.
    pub url: String,
    /// Headers to send.
    pub headers: BTreeMap<String, String>,
    /// Query parameters appended to the URL.
    pub query: BTreeMap<String, String>,
    /// Request body; empty when none is sent.
    pub body: String,
}

/// Transport failures. Surfaced to the user, never retried.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum HttpExecutionError {
    /// URL is empty or does not parse.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// No response within the timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The server could not be reached.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The response body could not be read.
    #[error("error reading response body: {0}")]
    BodyRead(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl HttpExecutionError {
    /// Returns the display category of this error.
    #[must_use]
    pub const fn kind(&self) -> RequestErrorKind {
        match self {
            Self::InvalidUrl(_) => RequestErrorKind::InvalidUrl,
            Self::Timeout { .. } => RequestErrorKind::Timeout,
            Self::ConnectionFailed(_) => RequestErrorKind::ConnectionFailed,
            Self::BodyRead(_) => RequestErrorKind::BodyRead,
            Self::Other(_) => RequestErrorKind::Unknown,
        }
    }
}

/// Port for executing HTTP requests.
pub trait HttpExecutor: Send + Sync {
    /// Performs the request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns an error on any transport failure. HTTP error statuses are
    /// responses, not errors.
    fn execute(
        &self,
        request: &ExecutionRequest,
    ) -> impl Future<Output = Result<HttpResponse, HttpExecutionError>> + Send;
}
