//! Folio Application - Client, session and ports
//!
//! This crate defines the application layer with:
//! - Port traits for the transport and the credential store
//! - The preconfigured [`ApiClient`] and its interceptor chains
//! - The [`RequestSession`] exposing `{loading, error, data}`
//! - Application-level error handling

pub mod api_client;
pub mod auth;
pub mod cancellation;
pub mod error;
pub mod interceptors;
pub mod ports;
pub mod request_session;

#[cfg(test)]
pub(crate) mod test_support;

pub use api_client::{
    ApiClient, ApiClientBuilder, ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS,
};
pub use auth::MemoryCredentialStore;
pub use cancellation::{CancellationReceiver, CancellationToken};
pub use error::{ApplicationError, ApplicationResult};
pub use interceptors::{
    BearerAuth, ClearCredentialsOnUnauthorized, RequestInterceptor, ResponseInterceptor,
};
pub use ports::{CredentialError, CredentialStore, HttpTransport, PreparedRequest, TransportError};
pub use request_session::{NETWORK_FAILURE_MESSAGE, RequestSession, SettlePolicy};
