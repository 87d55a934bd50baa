//! Normalized outcome of one API call.

/// The only status treated as success.
pub const SUCCESS_STATUS: u16 = 200;

/// Status used when the request failed before any HTTP status was received.
pub const TRANSPORT_ERROR_STATUS: u16 = 0;

/// Outcome of one [`ApiCaller`](super::ApiCaller) invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResult {
    /// HTTP status, [`SUCCESS_STATUS`] for any 2xx response.
    pub status: u16,
    /// Failure reason. `None` on success.
    pub message: Option<String>,
}

impl ApiResult {
    /// A successful call.
    pub fn ok() -> Self {
        Self {
            status: SUCCESS_STATUS,
            message: None,
        }
    }

    /// A failed call with its reason.
    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
        }
    }

    /// Whether the call succeeded.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    /// Failure reason, empty if none was given.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }
}
