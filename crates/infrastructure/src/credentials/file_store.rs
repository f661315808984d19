//! File-backed credential store.
//!
//! The token is kept in `<config dir>/folio/credentials.json`:
//! ```json
//! {
//!   "token": "eyJhbGciOi..."
//! }
//! ```
//!
//! Other top-level keys, whatever their type, are left as they are.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use folio_application::ports::{CredentialError, CredentialStore, TOKEN_KEY};
use serde_json::{Map, Value};
use tokio::fs;
use tokio::sync::Mutex;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

type Entries = Map<String, Value>;

/// Credential store persisting the token as JSON on disk.
///
/// A missing file means no token. Writes go through a lock so concurrent
/// `set`/`clear` calls on one store do not interleave.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Creates a store at `path`. Nothing is touched until the first write.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// `<config dir>/folio/credentials.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("folio").join("credentials.json"))
    }

    /// The file this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Entries, CredentialError> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Entries::new()),
            Ok(bytes) => from_json_bytes(&bytes)
                .map_err(|e| CredentialError::Serialization(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(CredentialError::Io(e)),
        }
    }

    async fn save(&self, entries: &Entries) -> Result<(), CredentialError> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path).await {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(CredentialError::Io(e)),
                _ => Ok(()),
            };
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content =
            to_json_stable_bytes(entries).map_err(|e| CredentialError::Serialization(e.to_string()))?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self) -> Result<Option<String>, CredentialError> {
        let entries = self.load().await?;
        Ok(entries
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn set(&self, token: &str) -> Result<(), CredentialError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.save(&entries).await?;
        tracing::debug!(path = %self.path.display(), "credential stored");
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(TOKEN_KEY).is_some() {
            self.save(&entries).await?;
            tracing::debug!(path = %self.path.display(), "credential cleared");
        }
        Ok(())
    }
}
