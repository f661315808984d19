//! Server error bodies and the normalized error handed to callers.
//!
//! Every failure leaving the client is an [`ApiError`] whose `message` has
//! been chosen by a fixed priority:
//!
//! 1. the server body's `message` field
//! 2. the server body's `error` field
//! 3. the transport's own message
//! 4. [`UNEXPECTED_ERROR_MESSAGE`]
//!
//! Empty strings count as absent at every step.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::response::ResponseSpec;

/// Message used when neither the server nor the transport said anything.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Unexpected error";

/// A field-level validation failure reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

/// Error body as sent by the backend.
///
/// All known fields are optional and keys the client does not know about
/// are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Primary error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Alternative error message field used by some APIs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Status code echoed in the body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Validation errors, in server order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    /// Any other keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApiErrorResponse {
    /// Parses a response body. Returns `None` unless it is a JSON object.
    ///
    /// Parsing is lenient: a known key holding an unexpected type is kept in
    /// `extra` instead of failing the whole body.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Option<Self> {
        serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(Self::from_value)
    }

    /// Builds an error body from an already-parsed JSON value.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut map) = value else {
            return None;
        };

        let message = take_string(&mut map, "message");
        let error = take_string(&mut map, "error");

        let status_code = match map.get("statusCode").and_then(Value::as_u64) {
            Some(code) => u16::try_from(code).ok().inspect(|_| {
                map.remove("statusCode");
            }),
            None => None,
        };

        let parsed = map
            .get("errors")
            .map(|raw| serde_json::from_value::<Vec<FieldError>>(raw.clone()));
        let errors = match parsed {
            Some(Ok(errors)) => {
                map.remove("errors");
                errors
            }
            _ => Vec::new(),
        };

        Some(Self {
            message,
            error,
            status_code,
            errors,
            extra: map,
        })
    }

    /// The message this body contributes, `message` before `error`.
    #[must_use]
    pub fn preferred_message(&self) -> Option<&str> {
        non_empty(self.message.as_deref()).or_else(|| non_empty(self.error.as_deref()))
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    if !map.get(key).is_some_and(Value::is_string) {
        return None;
    }
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Category of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// No response was received (DNS, connection, TLS).
    Network,
    /// The call exceeded its timeout.
    Timeout,
    /// The server answered with a non-2xx status.
    Status,
    /// A 2xx body could not be decoded into the expected type.
    Decode,
    /// The descriptor could not be turned into a request.
    InvalidRequest,
    /// The caller cancelled the call.
    Cancelled,
}

/// A failed call, carrying everything known about it.
///
/// Normalization only rewrites `message`; the status, parsed body, raw
/// body and transport message are preserved for callers that need them.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    /// Failure category
    pub kind: ApiErrorKind,
    /// User-facing message
    pub message: String,
    /// HTTP status, when a response was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Parsed error body, when the response carried a JSON object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ApiErrorResponse>,
    /// Message produced by the transport layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_message: Option<String>,
    /// Raw response body as text, when one was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ApiError {
    /// Creates an error from a transport-level failure.
    #[must_use]
    pub fn new(kind: ApiErrorKind, transport_message: impl Into<String>) -> Self {
        let transport_message = transport_message.into();
        Self {
            kind,
            message: transport_message.clone(),
            status: None,
            response: None,
            transport_message: Some(transport_message),
            body: None,
        }
    }

    /// Creates a network error (no response received).
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    /// Creates a timeout error with the conventional transport message.
    #[must_use]
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::new(
            ApiErrorKind::Timeout,
            format!("timeout of {timeout_ms}ms exceeded"),
        )
    }

    /// Creates an error for a descriptor that could not be sent.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::InvalidRequest, message)
    }

    /// Creates an error for a call the caller cancelled.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::new(ApiErrorKind::Cancelled, "Request cancelled")
    }

    /// Creates an error for a 2xx body that did not decode.
    #[must_use]
    pub fn decode(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(ApiErrorKind::Decode, message)
        }
    }

    /// Creates an error from a non-2xx response.
    #[must_use]
    pub fn from_response(response: &ResponseSpec) -> Self {
        let transport_message = format!("Request failed with status code {}", response.status);
        Self {
            kind: ApiErrorKind::Status,
            message: transport_message.clone(),
            status: Some(response.status),
            response: ApiErrorResponse::from_body(&response.body),
            transport_message: Some(transport_message),
            body: (!response.body.is_empty()).then(|| response.text()),
        }
    }

    /// The message the priority order selects, if any step has one.
    #[must_use]
    pub fn resolve_message(&self) -> Option<&str> {
        self.response
            .as_ref()
            .and_then(ApiErrorResponse::preferred_message)
            .or_else(|| non_empty(self.transport_message.as_deref()))
    }

    /// Rewrites `message` according to the priority order.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.message = self
            .resolve_message()
            .unwrap_or(UNEXPECTED_ERROR_MESSAGE)
            .to_string();
        self
    }

    /// Returns true for a 401 response.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }

    /// Validation errors reported by the server.
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        self.response
            .as_ref()
            .map_or(&[][..], |r| r.errors.as_slice())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn failed(status: u16, body: &Value) -> ApiError {
        let raw = ResponseSpec::new(status, serde_json::to_vec(body).unwrap(), Duration::ZERO);
        ApiError::from_response(&raw).normalized()
    }

    #[test]
    fn test_message_field_wins() {
        let err = failed(400, &json!({ "message": "A", "error": "B" }));
        assert_eq!(err.message, "A");
    }

    #[test]
    fn test_error_field_is_second() {
        let err = failed(400, &json!({ "error": "B" }));
        assert_eq!(err.message, "B");
    }

    #[test]
    fn test_empty_message_falls_through() {
        let err = failed(400, &json!({ "message": "", "error": "B" }));
        assert_eq!(err.message, "B");
    }

    #[test]
    fn test_transport_message_is_third() {
        let err = ApiError::timeout(10_000).normalized();
        assert_eq!(err.message, "timeout of 10000ms exceeded");

        let err = failed(502, &json!({ "detail": "upstream" }));
        assert_eq!(err.message, "Request failed with status code 502");
    }

    #[test]
    fn test_generic_fallback_is_last() {
        let err = ApiError::network("").normalized();
        assert_eq!(err.message, UNEXPECTED_ERROR_MESSAGE);
    }

    #[test]
    fn test_malformed_body_is_preserved_but_ignored() {
        let raw = ResponseSpec::new(500, b"<html>oops</html>".to_vec(), Duration::ZERO);
        let err = ApiError::from_response(&raw).normalized();
        assert_eq!(err.response, None);
        assert_eq!(err.body.as_deref(), Some("<html>oops</html>"));
        assert_eq!(err.message, "Request failed with status code 500");
    }

    #[test]
    fn test_normalization_keeps_other_fields() {
        let err = failed(
            422,
            &json!({
                "message": "Validation failed",
                "statusCode": 422,
                "errors": [{ "field": "email", "message": "is taken" }],
                "traceId": "t-1"
            }),
        );
        assert_eq!(err.kind, ApiErrorKind::Status);
        assert_eq!(err.status, Some(422));
        assert_eq!(
            err.field_errors(),
            &[FieldError {
                field: "email".to_string(),
                message: "is taken".to_string()
            }]
        );
        let body = err.response.unwrap();
        assert_eq!(body.status_code, Some(422));
        assert_eq!(body.extra.get("traceId"), Some(&json!("t-1")));
        assert_eq!(
            err.transport_message.as_deref(),
            Some("Request failed with status code 422")
        );
    }

    #[test]
    fn test_lenient_parsing_keeps_mistyped_keys() {
        let body = ApiErrorResponse::from_value(json!({
            "message": 42,
            "errors": "nope",
            "error": "Bad input"
        }))
        .unwrap();
        assert_eq!(body.message, None);
        assert_eq!(body.preferred_message(), Some("Bad input"));
        assert_eq!(body.extra.get("message"), Some(&json!(42)));
        assert_eq!(body.extra.get("errors"), Some(&json!("nope")));
    }

    #[test]
    fn test_non_object_bodies_are_not_error_responses() {
        assert_eq!(ApiErrorResponse::from_body(b"[1,2]"), None);
        assert_eq!(ApiErrorResponse::from_body(b"\"text\""), None);
        assert_eq!(ApiErrorResponse::from_body(b""), None);
    }

    #[test]
    fn test_unauthorized_detection() {
        let err = failed(401, &json!({ "error": "Unauthorized" }));
        assert!(err.is_unauthorized());
        assert!(!ApiError::timeout(1).is_unauthorized());
    }
}
