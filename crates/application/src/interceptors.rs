//! Request and response interceptors.
//!
//! Request interceptors run in registration order before every call and may
//! rewrite the [`PreparedRequest`]. Response interceptors run in
//! registration order on every settled call: successes pass through
//! `on_success`, failures through `on_error`. Message normalization always
//! runs after the response chain and is not an interceptor.

use std::sync::Arc;

use async_trait::async_trait;
use folio_domain::{ApiError, ResponseSpec};

use crate::ports::{CredentialStore, PreparedRequest};

/// Hook run before a request reaches the transport.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Inspects or rewrites the outgoing request.
    ///
    /// # Errors
    ///
    /// Returning an error aborts the call; the error then flows through
    /// the response chain like any other failure.
    async fn intercept(&self, request: &mut PreparedRequest) -> Result<(), ApiError>;
}

/// Hook run after a call settles.
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    /// Called with a 2xx response. Passes it through unchanged by default.
    ///
    /// # Errors
    ///
    /// Returning an error turns the success into a failure.
    async fn on_success(&self, response: ResponseSpec) -> Result<ResponseSpec, ApiError> {
        Ok(response)
    }

    /// Called with a failure. Passes it through unchanged by default.
    async fn on_error(&self, error: ApiError) -> ApiError {
        error
    }
}

/// Attaches `Authorization: Bearer <token>` when a token is stored.
///
/// A store that cannot be read is treated as holding no token.
pub struct BearerAuth {
    store: Arc<dyn CredentialStore>,
}

impl BearerAuth {
    /// Creates the interceptor over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestInterceptor for BearerAuth {
    async fn intercept(&self, request: &mut PreparedRequest) -> Result<(), ApiError> {
        match self.store.get().await {
            Ok(Some(token)) if !token.is_empty() => {
                request
                    .headers
                    .set("Authorization", format!("Bearer {token}"));
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "could not read stored credentials"),
        }
        Ok(())
    }
}

/// Clears the stored token when the server answers 401.
///
/// Only the side effect; the error itself continues unchanged.
pub struct ClearCredentialsOnUnauthorized {
    store: Arc<dyn CredentialStore>,
}

impl ClearCredentialsOnUnauthorized {
    /// Creates the interceptor over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ResponseInterceptor for ClearCredentialsOnUnauthorized {
    async fn on_error(&self, error: ApiError) -> ApiError {
        if error.is_unauthorized() {
            tracing::warn!("unauthorized, clearing credentials");
            if let Err(e) = self.store.clear().await {
                tracing::error!(error = %e, "failed to clear stored credentials");
            }
        }
        error
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::MemoryCredentialStore;
    use crate::test_support::FailingStore;
    use folio_domain::{Headers, HttpMethod};
    use std::time::Duration;
    use url::Url;

    fn prepared() -> PreparedRequest {
        PreparedRequest {
            method: HttpMethod::Get,
            url: Url::parse("https://api.example.com/me").unwrap(),
            headers: Headers::new(),
            body: None,
            timeout: Duration::from_secs(10),
        }
    }

    #[tokio::test]
    async fn test_bearer_attached_when_token_present() {
        let store = MemoryCredentialStore::with_token("abc");
        let interceptor = BearerAuth::new(Arc::new(store));
        let mut request = prepared();

        interceptor.intercept(&mut request).await.unwrap();

        assert_eq!(request.headers.get("authorization"), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_no_header_without_token() {
        let interceptor = BearerAuth::new(Arc::new(MemoryCredentialStore::new()));
        let mut request = prepared();

        interceptor.intercept(&mut request).await.unwrap();

        assert!(!request.headers.contains("Authorization"));
    }

    #[tokio::test]
    async fn test_unauthorized_clears_token() {
        let store = MemoryCredentialStore::with_token("stale");
        let interceptor = ClearCredentialsOnUnauthorized::new(Arc::new(store.clone()));
        let response = ResponseSpec::new(401, Vec::new(), Duration::ZERO);

        let error = interceptor.on_error(ApiError::from_response(&response)).await;

        assert_eq!(error.status, Some(401));
        assert_eq!(store.current().await, None);
    }

    #[tokio::test]
    async fn test_other_failures_keep_token() {
        let store = MemoryCredentialStore::with_token("fresh");
        let interceptor = ClearCredentialsOnUnauthorized::new(Arc::new(store.clone()));
        let response = ResponseSpec::new(403, Vec::new(), Duration::ZERO);

        interceptor.on_error(ApiError::from_response(&response)).await;

        assert_eq!(store.current().await.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_unreadable_store_sends_without_header() {
        let interceptor = BearerAuth::new(Arc::new(FailingStore));
        let mut request = prepared();

        interceptor.intercept(&mut request).await.unwrap();

        assert!(!request.headers.contains("Authorization"));
    }

    #[tokio::test]
    async fn test_failed_clear_keeps_the_unauthorized_error() {
        let interceptor = ClearCredentialsOnUnauthorized::new(Arc::new(FailingStore));
        let body = br#"{"message":"Session expired"}"#.to_vec();
        let response = ResponseSpec::new(401, body, Duration::ZERO);

        let error = interceptor
            .on_error(ApiError::from_response(&response))
            .await
            .normalized();

        assert_eq!(error.status, Some(401));
        assert_eq!(error.message, "Session expired");
    }
}
