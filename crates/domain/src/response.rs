//! HTTP responses as rendered and embedded in request documents.
//!
//! Headers are multi-valued because a server may repeat a header name.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A completed HTTP exchange as seen by the user.
///
/// Fields are declared alphabetically for deterministic serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    /// Response body decoded as text.
    #[serde(default)]
    pub body: String,
    /// Cookies set by the response.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cookies: Vec<ResponseCookie>,
    /// Round-trip time in microseconds.
    #[serde(default)]
    pub duration: u64,
    /// Response headers; every name maps to all of its values in order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub headers: BTreeMap<String, Vec<String>>,
    /// Body size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Status line text, e.g. `"200 OK"`.
    #[serde(default)]
    pub status: String,
    /// Numeric status code.
    #[serde(default)]
    pub status_code: u16,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status_code >= 200 && self.status_code < 300
    }

    /// Returns true for 3xx statuses.
    #[must_use]
    pub const fn is_redirection(&self) -> bool {
        self.status_code >= 300 && self.status_code < 400
    }

    /// Returns true for 4xx and 5xx statuses.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.status_code >= 400 && self.status_code < 600
    }

    /// Returns the round-trip time.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        Duration::from_micros(self.duration)
    }

    /// Returns the first value of a header, ignoring name case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }

    /// Returns the `Content-Type` header, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns true if the body is declared as JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.contains("application/json") || ct.contains("+json"))
    }

    /// Pretty-prints a JSON body; other bodies are returned unchanged.
    #[must_use]
    pub fn pretty_body(&self) -> String {
        serde_json::from_str::<serde_json::Value>(&self.body)
            .ok()
            .and_then(|value| serde_json::to_string_pretty(&value).ok())
            .unwrap_or_else(|| self.body.clone())
    }
}

/// A cookie received in a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseCookie {
    /// Domain the cookie applies to.
    #[serde(default)]
    pub domain: String,
    /// Expiry, absent for session cookies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    /// `HttpOnly` attribute.
    #[serde(default)]
    pub http_only: bool,
    /// Cookie name.
    pub name: String,
    /// Path the cookie applies to.
    #[serde(default)]
    pub path: String,
    /// `Secure` attribute.
    #[serde(default)]
    pub secure: bool,
    /// Cookie value.
    #[serde(default)]
    pub value: String,
}

impl ResponseCookie {
    /// Parses a `Set-Cookie` header value.
    ///
    /// `now` anchors `Max-Age`. Returns `None` when there is no `name=value`
    /// pair or the name is blank.
    #[must_use]
    pub fn from_set_cookie(header: &str, now: DateTime<Utc>) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Self {
            domain: String::new(),
            expires: None,
            http_only: false,
            name: name.to_string(),
            path: String::new(),
            secure: false,
            value: value.trim().trim_matches('"').to_string(),
        };
        let mut max_age = None;

        for part in parts {
            let part = part.trim();
            let (attr, val) = part.split_once('=').unwrap_or((part, ""));
            let val = val.trim();
            match attr.trim().to_ascii_lowercase().as_str() {
                "domain" => cookie.domain = val.trim_start_matches('.').to_string(),
                "path" => cookie.path = val.to_string(),
                "expires" => {
                    if let Ok(at) = DateTime::parse_from_rfc2822(val) {
                        cookie.expires = Some(at.with_timezone(&Utc));
                    }
                }
                "max-age" => max_age = val.parse::<i64>().ok(),
                "secure" => cookie.secure = true,
                "httponly" => cookie.http_only = true,
                _ => {}
            }
        }

        // Max-Age takes precedence over Expires.
        if let Some(secs) = max_age {
            cookie.expires = Some(now + chrono::Duration::seconds(secs));
        }

        Some(cookie)
    }
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

    fn response() -> HttpResponse {
        let mut headers = BTreeMap::new();
        headers.insert(
            "Content-Type".to_string(),
            vec!["application/json".to_string()],
        );
        headers.insert(
            "Set-Cookie".to_string(),
            vec!["a=1".to_string(), "b=2".to_string()],
        );
        HttpResponse {
            body: r#"{"ok":true}"#.to_string(),
            cookies: Vec::new(),
            duration: 1_500,
            headers,
            size: 11,
            status: "200 OK".to_string(),
            status_code: 200,
        }
    }

    #[test]
    fn test_status_helpers() {
        let r = response();
        assert!(r.is_success());
        assert!(!r.is_error());
        assert_eq!(r.elapsed(), Duration::from_micros(1_500));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let r = response();
        assert_eq!(r.content_type(), Some("application/json"));
        assert_eq!(r.header("set-cookie"), Some("a=1"));
        assert!(r.is_json());
    }

    #[test]
    fn test_pretty_body() {
        assert_eq!(response().pretty_body(), "{\n  \"ok\": true\n}");
        let mut plain = response();
        plain.body = "not json".to_string();
        assert_eq!(plain.pretty_body(), "not json");
    }

    #[test]
    fn test_parse_set_cookie() {
        let cookie = ResponseCookie::from_set_cookie(
            "session=abc; Domain=.api.test; Path=/; Secure; HttpOnly; Max-Age=60",
            now(),
        )
        .unwrap();
        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value, "abc");
        assert_eq!(cookie.domain, "api.test");
        assert_eq!(cookie.path, "/");
        assert!(cookie.secure);
        assert!(cookie.http_only);
        assert_eq!(cookie.expires, Some(now() + chrono::Duration::seconds(60)));
    }

    #[test]
    fn test_parse_set_cookie_rejects_garbage() {
        assert!(ResponseCookie::from_set_cookie("novalue", now()).is_none());
        assert!(ResponseCookie::from_set_cookie("=x", now()).is_none());
    }

    #[test]
    fn test_reads_null_collections() {
        let json = r#"{"statusCode":500,"status":"Request Error","headers":null,"cookies":null,"body":"boom","size":0,"duration":12}"#;
        let r: HttpResponse = serde_json::from_str(json).unwrap();
        assert!(r.headers.is_empty());
        assert!(r.cookies.is_empty());
        assert!(r.is_error());
    }
}
