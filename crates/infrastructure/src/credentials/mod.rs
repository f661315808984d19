//! Credential store adapters.
//!
//! The in-memory store lives in the application crate; this module adds the
//! file-backed one used by the CLI.

mod file_store;

pub use file_store::FileCredentialStore;
