//! Client settings.
//!
//! Values are layered, later sources winning:
//! 1. built-in defaults
//! 2. an optional TOML file (`<config dir>/folio/folio.toml` unless a path is given)
//! 3. environment variables prefixed `FOLIO_` (`FOLIO_API_URL`,
//!    `FOLIO_TIMEOUT_MS`, `FOLIO_CREDENTIALS_PATH`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use folio_application::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};

use crate::credentials::FileCredentialStore;

const ENV_PREFIX: &str = "FOLIO";

/// Errors raised while loading or applying settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A source could not be read or did not match the expected shape.
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was read but is not usable.
    #[error("invalid setting '{key}': {message}")]
    InvalidValue {
        /// Setting name.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioSettings {
    /// Base address of the API.
    pub api_url: String,
    /// Default timeout in milliseconds.
    pub timeout_ms: u64,
    /// Where the token is kept; the platform config directory when unset.
    pub credentials_path: Option<PathBuf>,
}

impl Default for FolioSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            credentials_path: None,
        }
    }
}

impl FolioSettings {
    /// Default settings file location.
    #[must_use]
    pub fn default_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("folio").join("folio.toml"))
    }

    /// Loads settings from `file` (or the default file) and the process
    /// environment. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed.
    pub fn load(file: Option<&Path>) -> Result<Self, SettingsError> {
        Self::build(file, Environment::with_prefix(ENV_PREFIX))
    }

    /// Like [`load`](Self::load), but reads variables from `vars` instead of
    /// the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed.
    pub fn load_with_env<I>(file: Option<&Path>, vars: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: config::Map<String, String> = vars.into_iter().collect();
        Self::build(file, Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    fn build(file: Option<&Path>, environment: Environment) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = file.map(Path::to_path_buf).or_else(Self::default_file) {
            tracing::debug!(path = %path.display(), "reading settings file");
            builder = builder.add_source(File::from(path).required(false));
        }
        let mut settings: Self = builder.add_source(environment).build()?.try_deserialize()?;

        if settings.api_url.trim().is_empty() {
            settings.api_url = DEFAULT_BASE_URL.to_string();
        }
        Ok(settings)
    }

    /// Builds the client configuration these settings describe.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not absolute or the timeout is zero.
    pub fn to_client_config(&self) -> Result<ClientConfig, SettingsError> {
        if self.timeout_ms == 0 {
            return Err(SettingsError::InvalidValue {
                key: "timeout_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        let mut config =
            ClientConfig::new(&self.api_url).map_err(|e| SettingsError::InvalidValue {
                key: "api_url",
                message: e.to_string(),
            })?;
        config.timeout = Duration::from_millis(self.timeout_ms);
        Ok(config)
    }

    /// The credential file to use, if one can be determined.
    #[must_use]
    pub fn credentials_path(&self) -> Option<PathBuf> {
        self.credentials_path
            .clone()
            .or_else(FileCredentialStore::default_path)
    }
}
