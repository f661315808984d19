//! Application error types

use thiserror::Error;

/// Errors raised while assembling the client, as opposed to errors of an
/// individual call (those are [`folio_domain::ApiError`]).
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The client configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
