//! Folio command-line front end.
//!
//! Wires settings, the credential file, the reqwest transport and a
//! [`RequestSession`] together for a single request.

pub mod cli;

use std::sync::Arc;

use anyhow::Context;
use folio_application::{ApiClient, CredentialStore, RequestSession};
use folio_domain::{RequestConfig, RequestState};
use folio_infrastructure::{FileCredentialStore, FolioSettings, ReqwestTransport};
use serde::Serialize;
use serde_json::Value;

pub use cli::Cli;

/// What one invocation produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOutcome {
    /// Session state after the request settled.
    #[serde(flatten)]
    pub state: RequestState<Value>,
    /// Status of the successful response, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl RunOutcome {
    /// True when the request recorded no error.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.state.error.is_none()
    }
}

/// Runs the request described by `cli`.
///
/// Request failures are not errors here: they end up in
/// [`RunOutcome::state`]. Errors are reserved for setup problems such as
/// unreadable settings or an invalid `--data` payload.
///
/// # Errors
///
/// Returns an error if settings, credentials or arguments are unusable.
pub async fn run(cli: Cli) -> anyhow::Result<RunOutcome> {
    let mut settings =
        FolioSettings::load(cli.config.as_deref()).context("failed to load settings")?;
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }
    if let Some(path) = cli.credentials {
        settings.credentials_path = Some(path);
    }
    let client_config = settings.to_client_config()?;

    let transport = Arc::new(ReqwestTransport::new()?);
    let mut builder = ApiClient::builder(transport).config(client_config);

    if let Some(path) = settings.credentials_path() {
        let store = Arc::new(FileCredentialStore::at(path));
        if let Some(token) = &cli.token {
            store.set(token).await.context("failed to store token")?;
        }
        if cli.logout {
            store.clear().await.context("failed to clear token")?;
        }
        builder = builder.credential_store(store);
    } else if cli.token.is_some() || cli.logout {
        anyhow::bail!("no configuration directory available; pass --credentials");
    }

    let mut config = RequestConfig::new(cli.method, cli.path);
    for (name, value) in cli.headers {
        config = config.with_header(name, value);
    }
    if let Some(data) = cli.data {
        let body: Value = serde_json::from_str(&data).context("--data must be valid JSON")?;
        config = config.with_body(body);
    }
    if let Some(timeout_ms) = cli.timeout {
        config = config.with_timeout(timeout_ms);
    }

    let session = RequestSession::<Value>::new(builder.build());
    tracing::info!(method = %config.method, url = %config.url, "sending request");
    let response = session.request(config).await;
    let state = session.snapshot();
    session.dispose();

    Ok(RunOutcome {
        state,
        status: response.map(|r| r.status),
    })
}
