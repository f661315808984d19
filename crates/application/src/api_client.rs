//! The preconfigured API client.
//!
//! One [`ApiClient`] is built at start-up and shared. It owns the base
//! address, timeout and default headers, runs the interceptor chains, and
//! turns every failure into a normalized [`ApiError`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use folio_domain::{ApiError, ApiResponse, Headers, RequestConfig, ResponseSpec};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ApplicationError, ApplicationResult};
use crate::interceptors::{
    BearerAuth, ClearCredentialsOnUnauthorized, RequestInterceptor, ResponseInterceptor,
};
use crate::ports::{CredentialStore, HttpTransport, PreparedRequest};

/// Base address used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.example.com";

/// Time allowed for a request unless the descriptor overrides it.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Static client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Address relative URLs are resolved against.
    pub base_url: Url,
    /// Default timeout.
    pub timeout: Duration,
    /// Headers sent with every request unless overridden per call.
    pub default_headers: Headers,
}

impl ClientConfig {
    /// Creates a configuration for `base_url` with the default timeout and
    /// JSON headers.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::InvalidConfig`] if `base_url` is not an
    /// absolute URL.
    pub fn new(base_url: &str) -> ApplicationResult<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| ApplicationError::InvalidConfig(format!("base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApplicationError::InvalidConfig(format!(
                "base URL '{base_url}' cannot be a base"
            )));
        }

        let mut default_headers = Headers::new();
        default_headers.set("Content-Type", "application/json");
        default_headers.set("Accept", "application/json");

        Ok(Self {
            base_url,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            default_headers,
        })
    }
}

impl Default for ClientConfig {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            default_headers: [
                ("Content-Type", "application/json"),
                ("Accept", "application/json"),
            ]
            .into_iter()
            .collect(),
        }
    }
}

struct ClientInner {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    credentials: Option<Arc<dyn CredentialStore>>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

/// Shared HTTP client. Cloning is cheap and clones share everything.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    /// Starts building a client over `transport`.
    #[must_use]
    pub fn builder(transport: Arc<dyn HttpTransport>) -> ApiClientBuilder {
        ApiClientBuilder::new(transport)
    }

    /// The static configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The credential store, when one is configured.
    #[must_use]
    pub fn credentials(&self) -> Option<&Arc<dyn CredentialStore>> {
        self.inner.credentials.as_ref()
    }

    /// Sends `config` and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`ApiError`] for transport failures, non-2xx
    /// responses and descriptors that cannot be sent.
    pub async fn send_raw(&self, config: &RequestConfig) -> Result<ResponseSpec, ApiError> {
        let outcome = self.dispatch(config).await;
        match outcome {
            Ok(response) => Ok(response),
            Err(error) => Err(self.fail(error).await),
        }
    }

    /// Sends `config` and decodes the JSON body into `T`.
    ///
    /// An empty body decodes as `null`, so `()` and `Option<_>` suit
    /// endpoints that answer 204.
    ///
    /// # Errors
    ///
    /// Same as [`send_raw`](Self::send_raw), plus an error of kind
    /// `Decode` if the body does not match `T`. Decode errors pass through
    /// the response interceptors like any other failure.
    pub async fn request<T: DeserializeOwned>(
        &self,
        config: &RequestConfig,
    ) -> Result<ApiResponse<T>, ApiError> {
        let response = self.send_raw(config).await?;
        let data = match response.json::<T>() {
            Ok(data) => data,
            Err(e) => {
                return Err(self
                    .fail(ApiError::decode(response.status, e.to_string()))
                    .await);
            }
        };
        Ok(ApiResponse {
            status: response.status,
            status_text: response.status_text,
            headers: response.headers,
            data,
            duration: response.duration,
        })
    }

    /// GET `url` and decode the body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<ApiResponse<T>, ApiError> {
        self.request(&RequestConfig::get(url)).await
    }

    /// POST `payload` as JSON to `url` and decode the body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request); payloads that fail to serialize are
    /// reported as `InvalidRequest`.
    pub async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        url: &str,
        payload: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        let config = RequestConfig::post(url)
            .with_json(payload)
            .map_err(|e| ApiError::invalid_request(e.to_string()).normalized())?;
        self.request(&config).await
    }

    async fn dispatch(&self, config: &RequestConfig) -> Result<ResponseSpec, ApiError> {
        let mut prepared = self.prepare(config)?;
        for interceptor in &self.inner.request_interceptors {
            interceptor.intercept(&mut prepared).await?;
        }

        tracing::debug!(method = %prepared.method, url = %prepared.url, "sending request");
        let started = Instant::now();
        let response = self.inner.transport.send(prepared).await?;
        tracing::debug!(
            status = response.status,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "response received"
        );

        if !response.is_success() {
            return Err(ApiError::from_response(&response));
        }

        let mut response = response;
        for interceptor in &self.inner.response_interceptors {
            response = interceptor.on_success(response).await?;
        }
        Ok(response)
    }

    async fn fail(&self, mut error: ApiError) -> ApiError {
        for interceptor in &self.inner.response_interceptors {
            error = interceptor.on_error(error).await;
        }
        error.normalized()
    }

    fn prepare(&self, config: &RequestConfig) -> Result<PreparedRequest, ApiError> {
        let settings = &self.inner.config;
        let url = config
            .resolve_url(&settings.base_url)
            .map_err(|e| ApiError::invalid_request(e.to_string()))?;

        let mut headers = settings.default_headers.clone();
        headers.merge(&config.headers);

        let body = match &config.body {
            Some(value) if config.method.allows_body() => Some(
                serde_json::to_vec(value).map_err(|e| ApiError::invalid_request(e.to_string()))?,
            ),
            _ => None,
        };

        let timeout = config
            .timeout_ms
            .map_or(settings.timeout, Duration::from_millis);

        Ok(PreparedRequest {
            method: config.method,
            url,
            headers,
            body,
            timeout,
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.inner.config)
            .field("has_credentials", &self.inner.credentials.is_some())
            .field("request_interceptors", &self.inner.request_interceptors.len())
            .field("response_interceptors", &self.inner.response_interceptors.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ApiClient`].
///
/// When a credential store is set, [`BearerAuth`] is installed first in the
/// request chain and [`ClearCredentialsOnUnauthorized`] first in the
/// response chain; without a store both steps are skipped.
pub struct ApiClientBuilder {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    credentials: Option<Arc<dyn CredentialStore>>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl ApiClientBuilder {
    /// Creates a builder with [`ClientConfig::default`].
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config: ClientConfig::default(),
            transport,
            credentials: None,
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
        }
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the base address.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn base_url(mut self, base_url: &str) -> ApplicationResult<Self> {
        self.config.base_url = ClientConfig::new(base_url)?.base_url;
        Ok(self)
    }

    /// Sets the default timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Adds or replaces a default header.
    #[must_use]
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.set(name, value);
        self
    }

    /// Sets the credential store.
    #[must_use]
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    /// Appends a request interceptor.
    #[must_use]
    pub fn request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_interceptors.push(interceptor);
        self
    }

    /// Appends a response interceptor.
    #[must_use]
    pub fn response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_interceptors.push(interceptor);
        self
    }

    /// Builds the client.
    #[must_use]
    pub fn build(self) -> ApiClient {
        let mut request_interceptors: Vec<Arc<dyn RequestInterceptor>> =
            Vec::with_capacity(self.request_interceptors.len() + 1);
        let mut response_interceptors: Vec<Arc<dyn ResponseInterceptor>> =
            Vec::with_capacity(self.response_interceptors.len() + 1);

        if let Some(store) = &self.credentials {
            request_interceptors.push(Arc::new(BearerAuth::new(Arc::clone(store))));
            response_interceptors.push(Arc::new(ClearCredentialsOnUnauthorized::new(
                Arc::clone(store),
            )));
        }
        request_interceptors.extend(self.request_interceptors);
        response_interceptors.extend(self.response_interceptors);

        ApiClient {
            inner: Arc::new(ClientInner {
                config: self.config,
                transport: self.transport,
                credentials: self.credentials,
                request_interceptors,
                response_interceptors,
            }),
        }
    }
}
