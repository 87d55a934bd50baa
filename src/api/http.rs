//! `reqwest` implementation of [`ApiCaller`].
//!
//! One call is one request: no retries, no circuit breaking. Any 2xx
//! response counts as success and its body is ignored. A non-2xx response or
//! a transport failure becomes a failed [`ApiResult`] and a warning.

use reqwest::header::ACCEPT;
use reqwest::{Client, Method, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ApiCaller, ApiResult, BoxFuture, TRANSPORT_ERROR_STATUS};
use crate::config::{BridgeConfig, JSON_MEDIA_TYPE};
use crate::error::Result;

/// Error payload shapes commonly returned by identity services.
///
/// Each key is read on its own so a body carrying several of them still
/// parses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<Value>,
    error: Option<Value>,
    detail: Option<Value>,
}

impl ErrorBody {
    /// First string among `message`, `error` and `detail`.
    fn into_message(self) -> Option<String> {
        [self.message, self.error, self.detail]
            .into_iter()
            .flatten()
            .find_map(|value| value.as_str().map(str::to_string))
    }
}

/// HTTP caller backed by a shared `reqwest::Client`.
pub struct HttpApiCaller {
    client: Client,
    base_url: String,
    method: Method,
}

impl HttpApiCaller {
    /// Create a caller from the bridge configuration.
    ///
    /// # Errors
    ///
    /// Returns an HTTP error if the client cannot be built (e.g. TLS backend
    /// initialisation fails).
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        let mut builder = Client::builder().default_headers(config.headers().clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url().to_string(),
            method: config.method().as_reqwest(),
        })
    }

    async fn execute(&self, endpoint: &str, token: &str, body: Option<&Value>) -> ApiResult {
        let url = join_url(&self.base_url, endpoint);
        debug!("Calling {} with method {}", url, self.method);

        let mut request = self
            .client
            .request(self.method.clone(), &url)
            .bearer_auth(token)
            .header(ACCEPT, JSON_MEDIA_TYPE);
        if let Some(body) = body {
            request = request.json(body);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => ApiResult::ok(),
            Ok(response) => {
                let status = response.status().as_u16();
                warn!("The server couldn't fulfill the request. Code: {}", status);
                ApiResult::failure(status, error_message(response).await)
            }
            Err(e) => {
                warn!("Failed to reach the server. Reason: {}", e);
                let status = e.status().map_or(TRANSPORT_ERROR_STATUS, |s| s.as_u16());
                ApiResult::failure(status, e.to_string())
            }
        }
    }
}

impl ApiCaller for HttpApiCaller {
    fn call<'a>(
        &'a self,
        endpoint: &'a str,
        token: &'a str,
        body: Option<&'a Value>,
    ) -> BoxFuture<'a, ApiResult> {
        Box::pin(self.execute(endpoint, token, body))
    }
}

/// Join a base URL and an endpoint with exactly one `/`.
///
/// # Example
///
/// ```
/// use extauth_bridge::api::join_url;
///
/// assert_eq!(
///     join_url("http://localhost:8000/auth/", "user/info"),
///     "http://localhost:8000/auth/user/info"
/// );
/// ```
pub fn join_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// Failure message from a response body.
///
/// Prefers a `message`/`error`/`detail` string from a JSON body, otherwise
/// the raw text.
async fn error_message(response: Response) -> String {
    match response.text().await {
        Ok(text) => message_from_body(&text),
        Err(e) => format!("unreadable response body: {}", e),
    }
}

fn message_from_body(text: &str) -> String {
    serde_json::from_str::<ErrorBody>(text)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve exactly one connection with a canned response.
    ///
    /// Returns the base URL and a receiver for the raw request head.
    async fn serve_once(response: String) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            tx.send(String::from_utf8_lossy(&request).into_owned()).ok();
        });

        (format!("http://{}/auth", addr), rx)
    }

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        )
    }

    fn caller(base_url: &str) -> HttpApiCaller {
        let config = BridgeConfig::builder().base_url(base_url).build().unwrap();
        HttpApiCaller::new(&config).unwrap()
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://h/auth", "user/info"), "http://h/auth/user/info");
        assert_eq!(join_url("http://h/auth/", "/user/info"), "http://h/auth/user/info");
        assert_eq!(join_url("http://h", ""), "http://h/");
    }

    #[tokio::test]
    async fn test_success_maps_to_200() {
        let (base_url, request) = serve_once(http_response("200 OK", "{}")).await;

        let result = caller(&base_url).call("user/info", "pw", None).await;
        assert_eq!(result, ApiResult::ok());

        let head = request.await.unwrap().to_lowercase();
        assert!(head.starts_with("get /auth/user/info http/1.1"), "{head}");
        assert!(head.contains("authorization: bearer pw"), "{head}");
        assert!(head.contains("accept: application/json"), "{head}");
        assert!(head.contains("content-type: application/json"), "{head}");
    }

    #[tokio::test]
    async fn test_any_2xx_maps_to_200() {
        let (base_url, _request) = serve_once(http_response("204 No Content", "")).await;

        let result = caller(&base_url).call("user/info", "pw", None).await;
        assert_eq!(result.status, 200);
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let (base_url, _request) = serve_once(http_response("401 Unauthorized", "token expired")).await;

        let result = caller(&base_url).call("user/info", "pw", None).await;
        assert_eq!(result, ApiResult::failure(401, "token expired"));
    }

    #[tokio::test]
    async fn test_error_status_extracts_json_message() {
        let body = r#"{"error":"invalid credentials","code":17}"#;
        let (base_url, _request) = serve_once(http_response("403 Forbidden", body)).await;

        let result = caller(&base_url).call("user/info", "pw", None).await;
        assert_eq!(result, ApiResult::failure(403, "invalid credentials"));
    }

    #[tokio::test]
    async fn test_error_body_with_several_message_keys() {
        let body = r#"{"message":"account locked","error":"forbidden"}"#;
        let (base_url, _request) = serve_once(http_response("403 Forbidden", body)).await;

        let result = caller(&base_url).call("user/info", "pw", None).await;
        assert_eq!(result, ApiResult::failure(403, "account locked"));
    }

    #[test]
    fn test_message_from_body() {
        assert_eq!(message_from_body(r#"{"detail":"expired"}"#), "expired");
        assert_eq!(message_from_body(r#"{"error":"bad","detail":"worse"}"#), "bad");
        // Non-string values are skipped
        assert_eq!(message_from_body(r#"{"error":{"code":7},"detail":"nested"}"#), "nested");
        assert_eq!(message_from_body(r#"{"code":7}"#), r#"{"code":7}"#);
        assert_eq!(message_from_body("  plain text\n"), "plain text");
        assert_eq!(message_from_body(r#"["a"]"#), r#"["a"]"#);
    }

    #[tokio::test]
    async fn test_configured_method_and_body() {
        let (base_url, request) = serve_once(http_response("200 OK", "")).await;
        let config = BridgeConfig::builder()
            .base_url(base_url)
            .method(crate::config::HttpMethod::Post)
            .build()
            .unwrap();
        let caller = HttpApiCaller::new(&config).unwrap();
        let body = serde_json::json!({ "user": "alice" });

        let result = caller.call("/user/info", "pw", Some(&body)).await;
        assert!(result.is_success());

        let head = request.await.unwrap().to_lowercase();
        assert!(head.starts_with("post /auth/user/info http/1.1"), "{head}");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Reserve a port, then close it so nothing is listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = caller(&format!("http://{}", addr)).call("user/info", "pw", None).await;
        assert_eq!(result.status, TRANSPORT_ERROR_STATUS);
        assert!(!result.message().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and never answer
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let config = BridgeConfig::builder()
            .base_url(format!("http://{}", addr))
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let caller = HttpApiCaller::new(&config).unwrap();

        let result = caller.call("user/info", "pw", None).await;
        assert_eq!(result.status, TRANSPORT_ERROR_STATUS);
        assert!(!result.is_success());
    }
}
