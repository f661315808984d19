//! In-memory credential storage.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{CredentialError, CredentialStore};

/// Thread-safe in-memory credential store.
///
/// Clones share the same slot, so a test can keep a handle and inspect
/// what the client did with the token.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    token: Arc<RwLock<Option<String>>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token.into()))),
        }
    }

    /// Returns the current token without going through the port.
    pub async fn current(&self) -> Option<String> {
        self.token.read().await.clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.token.read().await.clone())
    }

    async fn set(&self, token: &str) -> Result<(), CredentialError> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialError> {
        self.token.write().await.take();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.get().await.unwrap(), None);

        store.set("abc123").await.unwrap();
        assert_eq!(store.get().await.unwrap().as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let store = MemoryCredentialStore::with_token("abc123");
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.current().await, None);
    }

    #[tokio::test]
    async fn test_clones_share_the_slot() {
        let store = MemoryCredentialStore::new();
        let handle = store.clone();
        store.set("shared").await.unwrap();
        assert_eq!(handle.current().await.as_deref(), Some("shared"));
    }
}
