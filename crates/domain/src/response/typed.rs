//! Response with a decoded payload

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::spec::duration_millis;
use crate::request::Headers;

/// A successful response whose body was decoded into `T`.
///
/// Returned to callers so they can inspect status and headers alongside
/// the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// HTTP status code
    pub status: u16,
    /// Status text
    pub status_text: String,
    /// Response headers
    pub headers: Headers,
    /// Decoded payload
    pub data: T,
    /// Round-trip time
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}
