//! HTTP executor implementation using reqwest.
//!
//! This adapter implements the `HttpExecutor` port. It owns one
//! `reqwest::Client` for the whole process so connections are pooled
//! across sends.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use parcel_application::ports::{ExecutionRequest, HttpExecutionError, HttpExecutor};
use parcel_domain::{HttpMethod, HttpResponse, ResponseCookie};
use reqwest::header::{HeaderMap, SET_COOKIE};
use reqwest::{Client, Method, StatusCode};
use url::Url;

use crate::config::AppConfig;

/// HTTP executor backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: Client,
    timeout: Duration,
}

impl ReqwestExecutor {
    /// Creates an executor with the timeout and user agent from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, HttpExecutionError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| HttpExecutionError::Other(e.to_string()))?;

        Ok(Self {
            client,
            timeout: config.request_timeout,
        })
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Parses the base URL and appends the query rows.
    fn build_url(request: &ExecutionRequest) -> Result<Url, HttpExecutionError> {
        let mut url = Url::parse(request.url.trim())
            .map_err(|e| HttpExecutionError::InvalidUrl(format!("{e}: {}", request.url)))?;

        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// `"<code> <reason>"`, or just the code for unregistered statuses.
    fn status_text(status: StatusCode) -> String {
        match status.canonical_reason() {
            Some(reason) => format!("{} {reason}", status.as_str()),
            None => status.as_str().to_string(),
        }
    }

    fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
        let mut collected: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in headers {
            collected
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
        collected
    }

    fn collect_cookies(headers: &HeaderMap, url: &Url) -> Vec<ResponseCookie> {
        let now = Utc::now();
        headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|raw| ResponseCookie::from_set_cookie(raw, now))
            .map(|mut cookie| {
                if cookie.domain.is_empty() {
                    cookie.domain = url.host_str().unwrap_or_default().to_string();
                }
                cookie
            })
            .collect()
    }

    fn map_error(&self, error: &reqwest::Error) -> HttpExecutionError {
        if error.is_timeout() {
            return HttpExecutionError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }
        if error.is_connect() {
            return HttpExecutionError::ConnectionFailed(error.to_string());
        }
        if error.is_builder() {
            return HttpExecutionError::InvalidUrl(error.to_string());
        }
        HttpExecutionError::Other(error.to_string())
    }
}

impl HttpExecutor for ReqwestExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> Result<HttpResponse, HttpExecutionError> {
        let url = Self::build_url(request)?;
        tracing::debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let start = Instant::now();
        let response = builder.send().await.map_err(|e| self.map_error(&e))?;

        let status = response.status();
        let headers = Self::collect_headers(response.headers());
        let cookies = Self::collect_cookies(response.headers(), &url);

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                self.map_error(&e)
            } else {
                HttpExecutionError::BodyRead(e.to_string())
            }
        })?;
        let elapsed = start.elapsed();

        Ok(HttpResponse {
            body: String::from_utf8_lossy(&bytes).into_owned(),
            cookies,
            duration: u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
            headers,
            size: bytes.len() as u64,
            status: Self::status_text(status),
            status_code: status.as_u16(),
        })
    }
}
