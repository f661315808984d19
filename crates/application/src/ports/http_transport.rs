//! HTTP transport port

use std::time::Duration;

use async_trait::async_trait;
use folio_domain::{ApiError, ApiErrorKind, Headers, HttpMethod, ResponseSpec};
use thiserror::Error;
use url::Url;

/// A request after URL resolution, header merging and body encoding.
///
/// Request interceptors receive this and may change it before it reaches
/// the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute target URL
    pub url: Url,
    /// Final header set
    pub headers: Headers,
    /// Encoded body
    pub body: Option<Vec<u8>>,
    /// Time allowed for the whole round trip
    pub timeout: Duration,
}

/// Failures that happen before a response is received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The round trip exceeded its timeout.
    #[error("timeout of {timeout_ms}ms exceeded")]
    Timeout {
        /// The timeout that was exceeded.
        timeout_ms: u64,
    },

    /// The server could not be reached.
    #[error("{0}")]
    Network(String),

    /// The request could not be built.
    #[error("{0}")]
    InvalidRequest(String),
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Timeout { timeout_ms } => Self::timeout(timeout_ms),
            TransportError::Network(message) => Self::new(ApiErrorKind::Network, message),
            TransportError::InvalidRequest(message) => Self::invalid_request(message),
        }
    }
}

/// Port for performing one HTTP round trip.
///
/// Implementations return any received response, whatever its status;
/// classifying non-2xx responses is the client's job.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `request` and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response was received.
    async fn send(&self, request: PreparedRequest) -> Result<ResponseSpec, TransportError>;
}
