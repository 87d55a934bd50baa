//! Bridge configuration.
//!
//! [`BridgeConfig`] is built once at startup through [`BridgeConfigBuilder`]
//! and never changes afterwards. It is injected into the HTTP caller and the
//! session.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use extauth_bridge::config::{BridgeConfig, HttpMethod};
//!
//! let config = BridgeConfig::builder()
//!     .base_url("https://id.example.com/auth/")
//!     .endpoint("user/info")
//!     .method(HttpMethod::Post)
//!     .timeout(Duration::from_secs(5))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.endpoint(), "user/info");
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::error::{BridgeError, Result};

/// Default base URL of the identity service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/auth/";

/// Default endpoint, relative to the base URL.
pub const DEFAULT_ENDPOINT: &str = "user/info";

/// Default log directory.
pub const DEFAULT_LOG_DIR: &str = "/var/log/ejabberd";

/// Media type sent in `Content-Type` and `Accept`.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// HTTP method used for API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    /// `GET`, what a bodiless request has always used.
    #[default]
    Get,
    /// `POST`.
    Post,
    /// `PUT`.
    Put,
}

impl HttpMethod {
    /// The matching `reqwest` method.
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        })
    }
}

impl FromStr for HttpMethod {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            _ => Err(BridgeError::Config(format!("unsupported HTTP method: {}", s))),
        }
    }
}

/// Immutable process configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    base_url: String,
    endpoint: String,
    method: HttpMethod,
    headers: HeaderMap,
    timeout: Option<Duration>,
    exit_on_eof: bool,
}

impl BridgeConfig {
    /// Create a new configuration builder.
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::new()
    }

    /// Base URL of the identity service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint used for `auth`.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// HTTP method for API calls.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Headers sent with every API call.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Request timeout. `None` leaves the transport default (no timeout).
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Whether closed input ends the session instead of answering `false`.
    pub fn exit_on_eof(&self) -> bool {
        self.exit_on_eof
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            method: HttpMethod::default(),
            headers: default_headers(),
            timeout: None,
            exit_on_eof: false,
        }
    }
}

/// Headers every API call carries unless overridden.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));
    headers
}

/// Parse a `Name: Value` header line.
///
/// # Errors
///
/// Returns a configuration error if the line has no `:` or an empty name.
pub fn parse_header(line: &str) -> Result<(String, String)> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| BridgeError::Config(format!("expected 'Name: Value', got '{}'", line)))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(BridgeError::Config(format!("empty header name in '{}'", line)));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Builder for [`BridgeConfig`].
pub struct BridgeConfigBuilder {
    base_url: String,
    endpoint: String,
    method: HttpMethod,
    extra_headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    exit_on_eof: bool,
}

impl BridgeConfigBuilder {
    /// Create a builder holding the defaults.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            method: HttpMethod::default(),
            extra_headers: Vec::new(),
            timeout: None,
            exit_on_eof: false,
        }
    }

    /// Set the base URL.
    ///
    /// Default: `http://localhost:8000/auth/`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the endpoint, relative to the base URL.
    ///
    /// Default: `user/info`
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the HTTP method.
    ///
    /// Default: GET
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Add a header sent with every call. Replaces a default of the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the request timeout, `None` for no timeout.
    pub fn timeout_opt(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// End the session when input closes.
    ///
    /// Default: false (closed input is answered like an empty command)
    pub fn exit_on_eof(mut self, exit: bool) -> Self {
        self.exit_on_eof = exit;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unparsable or non-HTTP base URL,
    /// a zero timeout, or an invalid header.
    pub fn build(self) -> Result<BridgeConfig> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| BridgeError::Config(format!("invalid base URL '{}': {}", self.base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BridgeError::Config(format!(
                "base URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        if self.timeout == Some(Duration::ZERO) {
            return Err(BridgeError::Config("timeout must be greater than zero".to_string()));
        }

        let mut headers = default_headers();
        for (name, value) in &self.extra_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| BridgeError::Config(format!("invalid header name '{}': {}", name, e)))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| BridgeError::Config(format!("invalid value for header '{}': {}", name, e)))?;
            headers.insert(header_name, header_value);
        }

        Ok(BridgeConfig {
            base_url: self.base_url,
            endpoint: self.endpoint,
            method: self.method,
            headers,
            timeout: self.timeout,
            exit_on_eof: self.exit_on_eof,
        })
    }
}

impl Default for BridgeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
