//! Credential handling.
//!
//! This module provides the in-memory credential store used by tests and
//! by processes that do not persist their login.

mod memory_store;

pub use memory_store::MemoryCredentialStore;
