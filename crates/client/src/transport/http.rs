//! HTTP transport layer for the USAspending client.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use reqwest::{header, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Stands in for an error body that could not be read.
const UNREADABLE_BODY: &str = "<unreadable body>";

/// HTTP transport for making API requests.
///
/// Each call issues exactly one request. Dropping the returned future
/// abandons the request.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> ClientResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Build a URL by appending path segments to the base URL.
    ///
    /// Segments are percent-encoded individually, so a caller-supplied
    /// identifier can never introduce extra path components. Upstream routes
    /// all end in `/`.
    pub(crate) fn build_url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::Config(format!(
                    "Base URL cannot carry a path: {}",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    /// Send a request once and decode a successful JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request_builder: RequestBuilder,
        url: &Url,
    ) -> ClientResult<T> {
        let response = request_builder
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, url))?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response.text().await, url);
            warn!(status = status.as_u16(), url = %url, "Upstream returned error status");
            return Err(ClientError::from_response(status.as_u16(), url, &body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::from_transport(e, url))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Execute a GET request.
    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        let url = self.build_url(segments)?;
        debug!(url = %url, "GET request");

        self.execute(self.client.get(url.clone()), &url).await
    }

    /// Execute a POST request with a JSON body.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> ClientResult<T> {
        let url = self.build_url(segments)?;
        debug!(url = %url, "POST request");

        self.execute(self.client.post(url.clone()).json(body), &url)
            .await
    }
}

/// Text of an error response, or a placeholder when the body read failed.
fn error_body<E: std::fmt::Display>(read: Result<String, E>, url: &Url) -> String {
    match read {
        Ok(body) => body,
        Err(e) => {
            warn!(url = %url, error = %e, "Failed to read upstream error body");
            UNREADABLE_BODY.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestResponse {
        message: String,
        value: i32,
    }

    #[derive(Debug, Serialize)]
    struct TestRequest {
        name: String,
    }

    fn create_config(base_url: &str) -> Arc<ClientConfig> {
        Arc::new(ClientConfig::new(url::Url::parse(base_url).unwrap()))
    }

    fn create_config_with_timeout(base_url: &str, timeout: Duration) -> Arc<ClientConfig> {
        Arc::new(ClientConfig {
            timeout,
            ..ClientConfig::new(url::Url::parse(base_url).unwrap())
        })
    }

    #[tokio::test]
    async fn test_get_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/test/"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(TestResponse {
                message: "success".to_string(),
                value: 42,
            }))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri())).unwrap();

        let result: TestResponse = transport.get(&["api", "test"]).await.unwrap();
        assert_eq!(result.message, "success");
        assert_eq!(result.value, 42);
    }

    #[tokio::test]
    async fn test_post_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/create/"))
            .and(body_json(serde_json::json!({"name": "test"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(TestResponse {
                message: "created".to_string(),
                value: 1,
            }))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri())).unwrap();

        let request = TestRequest {
            name: "test".to_string(),
        };
        let result: TestResponse = transport.post(&["api", "create"], &request).await.unwrap();
        assert_eq!(result.message, "created");
    }

    #[tokio::test]
    async fn test_error_on_400_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/bad/"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"detail": "Bad Request"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri())).unwrap();

        let result: ClientResult<TestResponse> = transport.get(&["api", "bad"]).await;
        match result {
            Err(ClientError::Api {
                status, message, ..
            }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Bad Request");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_on_500_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/down/"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri())).unwrap();

        let err = transport
            .get::<TestResponse>(&["api", "down"])
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/garbage/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri())).unwrap();

        let err = transport
            .get::<serde_json::Value>(&["api", "garbage"])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Json(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/slow/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_secs(2)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = create_config_with_timeout(&server.uri(), Duration::from_millis(100));
        let transport = HttpTransport::new(config).unwrap();

        let err = transport
            .get::<serde_json::Value>(&["api", "slow"])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Nothing listens on the discard port
        let transport = HttpTransport::new(create_config("http://127.0.0.1:9")).unwrap();

        let err = transport
            .get::<serde_json::Value>(&["api", "test"])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Http(_) | ClientError::Timeout(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_build_url() {
        let transport = HttpTransport::new(create_config("http://localhost:8080")).unwrap();

        let url = transport.build_url(&["api", "v2", "spending"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v2/spending/");
    }

    #[test]
    fn test_build_url_keeps_base_path() {
        let transport = HttpTransport::new(create_config("http://localhost:8080/proxy/")).unwrap();

        let url = transport.build_url(&["api", "v2", "awards"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/proxy/api/v2/awards/");
    }

    #[test]
    fn test_build_url_encodes_segments() {
        let transport = HttpTransport::new(create_config("http://localhost:8080")).unwrap();

        let url = transport
            .build_url(&["api", "v2", "awards", "../admin?x=1"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/v2/awards/..%2Fadmin%3Fx=1/"
        );
    }

    #[test]
    fn test_unreadable_error_body_is_reported() {
        let url = Url::parse("http://localhost:8080/api/v2/spending/").unwrap();

        let body = error_body(Err("connection reset mid-body"), &url);
        assert_eq!(body, UNREADABLE_BODY);

        let err = ClientError::from_response(502, &url, &body);
        match err {
            ClientError::Api { status, message, .. } => {
                assert_eq!(status, 502);
                assert_eq!(message, "<unreadable body>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_readable_error_body_passes_through() {
        let url = Url::parse("http://localhost:8080/api/v2/spending/").unwrap();

        let body = error_body::<String>(Ok("{\"detail\":\"bad\"}".to_string()), &url);
        assert_eq!(body, "{\"detail\":\"bad\"}");
    }
}
