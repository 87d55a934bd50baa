//! Error types for extauth-bridge.

use thiserror::Error;

/// Framing failures on the inbound byte stream.
///
/// Any of these means the peer broke the framing contract, so the session
/// stops reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    /// The stream closed after one byte of the 2-byte length prefix.
    #[error("incomplete length prefix")]
    IncompleteLengthPrefix,

    /// The stream closed before the announced payload was complete.
    #[error("incomplete payload: expected {expected} bytes, got {received}")]
    IncompletePayload {
        /// Length announced by the prefix.
        expected: usize,
        /// Bytes actually received before end of input.
        received: usize,
    },

    /// An outbound payload does not fit a 16-bit length prefix.
    #[error("payload of {0} bytes exceeds the 65535 byte frame limit")]
    PayloadTooLarge(usize),
}

/// Main error type for all bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// I/O error on the protocol streams.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or truncated frame.
    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    /// JSON serialization error for request bodies.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type alias using BridgeError.
pub type Result<T> = std::result::Result<T, BridgeError>;
