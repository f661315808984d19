//! Credential store port
//!
//! Holds the single bearer token the client attaches to outgoing requests.

use async_trait::async_trait;

/// Key the token is stored under.
pub const TOKEN_KEY: &str = "token";

/// Errors that can occur while reading or writing the credential.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Storage for the bearer token.
///
/// Written by a login flow, read before every request, cleared when the
/// server answers 401.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the stored token, if any.
    async fn get(&self) -> Result<Option<String>, CredentialError>;

    /// Stores `token`, replacing any previous one.
    async fn set(&self, token: &str) -> Result<(), CredentialError>;

    /// Removes the stored token. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<(), CredentialError>;
}
