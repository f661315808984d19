//! Request descriptor built per call by the caller

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::{Headers, HttpMethod};
use crate::error::{DomainError, DomainResult};

/// Describes one HTTP call.
///
/// `url` may be absolute or relative to the client's base address. Headers
/// set here override the client defaults; `timeout_ms` overrides the client
/// timeout for this call only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestConfig {
    /// HTTP method
    #[serde(default)]
    pub method: HttpMethod,
    /// Target URL, absolute or relative to the base address
    pub url: String,
    /// Per-call headers
    #[serde(default, skip_serializing_if = "Headers::is_empty")]
    pub headers: Headers,
    /// JSON payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Timeout override in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl RequestConfig {
    /// Creates a descriptor for `method` and `url` with no headers or body.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::default()
        }
    }

    /// Creates a GET descriptor.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Creates a POST descriptor.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// Creates a PUT descriptor.
    #[must_use]
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    /// Creates a PATCH descriptor.
    #[must_use]
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, url)
    }

    /// Creates a DELETE descriptor.
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Sets a header, replacing an existing one with the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Attaches an already-built JSON payload.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serializes `payload` and attaches it as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidBody`] if the payload cannot be
    /// represented as JSON.
    pub fn with_json<B: Serialize>(mut self, payload: &B) -> DomainResult<Self> {
        let body =
            serde_json::to_value(payload).map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }

    /// Overrides the client timeout for this call.
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Checks the minimum a descriptor needs: a non-empty URL and, when
    /// given, a non-zero timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] when the URL is blank and
    /// [`DomainError::ZeroTimeout`] for `timeout_ms == Some(0)`.
    pub fn validate(&self) -> DomainResult<()> {
        if self.url.trim().is_empty() {
            return Err(DomainError::InvalidUrl("URL is required".to_string()));
        }
        if self.timeout_ms == Some(0) {
            return Err(DomainError::ZeroTimeout);
        }
        Ok(())
    }

    /// Resolves the target against `base`.
    ///
    /// Absolute URLs are used as-is. Relative URLs are appended to the full
    /// base path with exactly one slash between them, so a base of
    /// `https://host/v1` and a URL of `users` yields `https://host/v1/users`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] if the result does not parse.
    pub fn resolve_url(&self, base: &Url) -> DomainResult<Url> {
        self.validate()?;
        let target = self.url.trim();
        let joined = if is_absolute_url(target) {
            if target.starts_with("//") {
                format!("{}:{target}", base.scheme())
            } else {
                target.to_string()
            }
        } else {
            format!(
                "{}/{}",
                base.as_str().trim_end_matches('/'),
                target.trim_start_matches('/')
            )
        };
        Url::parse(&joined).map_err(|e| DomainError::InvalidUrl(format!("{e}: {joined}")))
    }
}

/// Returns true if `url` carries a scheme (`https://...`) or is
/// protocol-relative (`//host/...`).
#[must_use]
pub fn is_absolute_url(url: &str) -> bool {
    if url.starts_with("//") {
        return true;
    }
    let Some((scheme, _)) = url.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
