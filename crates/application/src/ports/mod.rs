//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod credential_store;
mod http_transport;

pub use credential_store::{CredentialError, CredentialStore, TOKEN_KEY};
pub use http_transport::{HttpTransport, PreparedRequest, TransportError};
