//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A per-request timeout of zero was given.
    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    /// The request body could not be encoded.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// A media query could not be parsed.
    #[error("invalid media query: {0}")]
    InvalidMediaQuery(String),

    /// A root margin could not be parsed.
    #[error("invalid root margin: {0}")]
    InvalidRootMargin(String),

    /// An intersection threshold lies outside `0.0..=1.0`.
    #[error("thresholds must be within 0..=1, got {0}")]
    InvalidThreshold(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
