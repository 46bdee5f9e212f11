//! Execute request use case.
//!
//! Turns a request document into what the execution engine receives and
//! hands it over. Responses are returned as-is; retries are never attempted.

use parcel_domain::RequestDocument;
use parcel_domain::request::pairs;
use tracing::{debug, warn};

use crate::ports::{ExecutionRequest, HttpExecutionError, HttpExecutor};

/// Use case for sending the request being edited.
#[derive(Debug, Clone)]
pub struct ExecuteRequest<H> {
    executor: H,
}

impl<H: HttpExecutor> ExecuteRequest<H> {
    /// Creates a new `ExecuteRequest` use case.
    #[must_use]
    pub const fn new(executor: H) -> Self {
        Self { executor }
    }

    /// Builds the execution request from a document.
    ///
    /// Incomplete header and query rows are dropped, the inferred
    /// `Content-Type` is added and no body is sent for body type none.
    ///
    /// # Errors
    ///
    /// Returns [`HttpExecutionError::InvalidUrl`] if the URL is empty or not
    /// http/https.
    pub fn build(document: &RequestDocument) -> Result<ExecutionRequest, HttpExecutionError> {
        let url = document.url.trim();
        if url.is_empty() {
            return Err(HttpExecutionError::InvalidUrl("URL is required".to_string()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(HttpExecutionError::InvalidUrl(format!(
                "{url} (must start with http:// or https://)"
            )));
        }

        let normalized = document.clone().normalized();
        Ok(ExecutionRequest {
            method: normalized.method,
            url: url.to_string(),
            headers: pairs::to_map(&normalized.headers),
            query: pairs::to_map(&normalized.query),
            body: normalized.body,
        })
    }

    /// Validates and sends the document.
    ///
    /// # Errors
    ///
    /// Returns the validation error or the executor's transport error.
    pub async fn execute(
        &self,
        document: &RequestDocument,
    ) -> Result<parcel_domain::HttpResponse, HttpExecutionError> {
        let request = Self::build(document)?;
        debug!(method = %request.method, url = %request.url, "sending request");
        match self.executor.execute(&request).await {
            Ok(response) => {
                debug!(status = response.status_code, micros = response.duration, "response received");
                Ok(response)
            }
            Err(error) => {
                warn!(url = %request.url, %error, "request failed");
                Err(error)
            }
        }
    }
}
