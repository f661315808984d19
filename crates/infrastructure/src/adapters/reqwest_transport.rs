//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port. It performs exactly one
//! round trip per call and hands back whatever the server answered; status
//! classification happens in the client.

use std::time::Instant;

use async_trait::async_trait;
use folio_application::ports::{HttpTransport, PreparedRequest, TransportError};
use folio_domain::{Header, Headers, HttpMethod, ResponseSpec};
use reqwest::{Client, Method};

/// Transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with default settings.
    ///
    /// Default configuration:
    /// - Follow redirects: up to 10
    /// - User-Agent: `folio/<version>`
    ///
    /// Timeouts are applied per request from [`PreparedRequest::timeout`].
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be created.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        Ok(Self { client })
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }
        if error.is_builder() {
            return TransportError::InvalidRequest(error.to_string());
        }
        TransportError::Network(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: PreparedRequest) -> Result<ResponseSpec, TransportError> {
        let timeout_ms = u64::try_from(request.timeout.as_millis()).unwrap_or(u64::MAX);
        let started = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), request.url)
            .timeout(request.timeout);
        for header in request.headers.iter() {
            builder = builder.header(&header.name, &header.value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;

        let status = response.status().as_u16();
        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            headers.append(Header::new(
                name.as_str(),
                value.to_str().unwrap_or("<binary>"),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?
            .to_vec();

        Ok(ResponseSpec::new(status, body, started.elapsed()).with_headers(headers))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prepared(method: HttpMethod, url: &str) -> PreparedRequest {
        PreparedRequest {
            method,
            url: Url::parse(url).unwrap(),
            headers: Headers::new(),
            body: None,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_maps_every_method() {
        assert_eq!(ReqwestTransport::to_reqwest_method(HttpMethod::Get), Method::GET);
        assert_eq!(ReqwestTransport::to_reqwest_method(HttpMethod::Post), Method::POST);
        assert_eq!(ReqwestTransport::to_reqwest_method(HttpMethod::Patch), Method::PATCH);
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Options),
            Method::OPTIONS
        );
    }

    #[tokio::test]
    async fn test_sends_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .and(header("authorization", "Bearer abc"))
            .and(body_json(serde_json::json!({ "name": "Ada" })))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("x-request-id", "42")
                    .set_body_json(serde_json::json!({ "id": 1 })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut request = prepared(HttpMethod::Post, &format!("{}/users", server.uri()));
        request.headers.set("Authorization", "Bearer abc");
        request.headers.set("Content-Type", "application/json");
        request.body = Some(br#"{"name":"Ada"}"#.to_vec());

        let response = ReqwestTransport::new().unwrap().send(request).await.unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.headers.get("X-Request-Id"), Some("42"));
        assert_eq!(response.json::<serde_json::Value>().unwrap()["id"], 1);
    }

    #[tokio::test]
    async fn test_error_statuses_are_returned_as_responses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({ "message": "Not found" })),
            )
            .mount(&server)
            .await;

        let response = ReqwestTransport::new()
            .unwrap()
            .send(prepared(HttpMethod::Get, &format!("{}/missing", server.uri())))
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.status_text, "Not Found");
    }

    #[tokio::test]
    async fn test_slow_responses_time_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let mut request = prepared(HttpMethod::Get, &format!("{}/slow", server.uri()));
        request.timeout = Duration::from_millis(50);

        let error = ReqwestTransport::new().unwrap().send(request).await.unwrap_err();

        assert_eq!(error, TransportError::Timeout { timeout_ms: 50 });
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_network_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let error = ReqwestTransport::new()
            .unwrap()
            .send(prepared(HttpMethod::Get, &format!("http://127.0.0.1:{port}/")))
            .await
            .unwrap_err();

        assert!(matches!(error, TransportError::Network(_)), "{error:?}");
    }
}
