//! Folio Domain - Core types
//!
//! This crate defines the domain model for the Folio API client: request
//! descriptors, responses, the normalized error shape, the request-state
//! record and headless viewport utilities.
//! All types here are pure Rust with no I/O dependencies.

pub mod api_error;
pub mod error;
pub mod request;
pub mod response;
pub mod state;
pub mod viewport;

pub use api_error::{ApiError, ApiErrorKind, ApiErrorResponse, FieldError, UNEXPECTED_ERROR_MESSAGE};
pub use error::{DomainError, DomainResult};
pub use request::{Header, Headers, HttpMethod, RequestConfig};
pub use response::{ApiResponse, ResponseSpec};
pub use state::{RequestPhase, RequestState};
