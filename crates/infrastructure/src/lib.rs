//! Folio Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus settings loading.

pub mod adapters;
pub mod credentials;
pub mod serialization;
pub mod settings;

pub use adapters::ReqwestTransport;
pub use credentials::FileCredentialStore;
pub use serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};
pub use settings::{FolioSettings, SettingsError};
