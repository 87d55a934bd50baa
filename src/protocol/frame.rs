//! Frame struct and frame building.
//!
//! Represents one inbound protocol message. Uses `bytes::Bytes` for the
//! payload so it can be handed around without copying.
//!
//! # Example
//!
//! ```
//! use extauth_bridge::protocol::{build_frame, Frame};
//! use bytes::Bytes;
//!
//! let frame = Frame::new(Bytes::from_static(b"isuser:alice:example.com"));
//! assert_eq!(frame.payload_len(), 24);
//!
//! let bytes = build_frame(frame.payload()).unwrap();
//! assert_eq!(&bytes[..2], &[0, 24]);
//! ```

use std::borrow::Cow;

use bytes::Bytes;

use super::wire_format::{encode_length, LENGTH_PREFIX_SIZE};
use crate::error::{FramingError, Result};

/// A complete inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Payload bytes (length prefix already stripped).
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame from its payload.
    pub fn new(payload: Bytes) -> Self {
        Self { payload }
    }

    /// Create a frame from raw bytes (copies data).
    pub fn from_slice(payload: &[u8]) -> Self {
        Self {
            payload: Bytes::copy_from_slice(payload),
        }
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Get the payload length.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Payload as text. Invalid UTF-8 sequences are replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// Result of reading from the inbound stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A complete frame.
    Frame(Frame),
    /// The stream was closed before any byte of a new frame arrived.
    EndOfInput,
}

/// Build a complete length-prefixed frame as a single byte vector.
///
/// This is what the chat server sends; the bridge itself only ever writes
/// replies.
///
/// # Errors
///
/// Returns [`FramingError::PayloadTooLarge`] if the payload does not fit a
/// 16-bit length.
pub fn build_frame(payload: &[u8]) -> Result<Vec<u8>> {
    let length =
        u16::try_from(payload.len()).map_err(|_| FramingError::PayloadTooLarge(payload.len()))?;

    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    buf.extend_from_slice(&encode_length(length));
    buf.extend_from_slice(payload);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::protocol::MAX_PAYLOAD_SIZE;

    #[test]
    fn test_frame_creation() {
        let frame = Frame::new(Bytes::from_static(b"auth:a:b:c"));

        assert_eq!(frame.payload(), b"auth:a:b:c");
        assert_eq!(frame.payload_len(), 10);
        assert_eq!(frame.text(), "auth:a:b:c");
    }

    #[test]
    fn test_frame_from_slice() {
        let frame = Frame::from_slice(b"tryregister");
        assert_eq!(frame, Frame::new(Bytes::from_static(b"tryregister")));
    }

    #[test]
    fn test_frame_text_replaces_invalid_utf8() {
        let frame = Frame::from_slice(&[b'a', 0xFF, b'b']);
        assert_eq!(frame.text(), "a\u{FFFD}b");
    }

    #[test]
    fn test_build_frame() {
        let bytes = build_frame(b"hello").unwrap();

        assert_eq!(bytes.len(), LENGTH_PREFIX_SIZE + 5);
        assert_eq!(&bytes[..LENGTH_PREFIX_SIZE], &[0x00, 0x05]);
        assert_eq!(&bytes[LENGTH_PREFIX_SIZE..], b"hello");
    }

    #[test]
    fn test_build_frame_empty_payload() {
        let bytes = build_frame(b"").unwrap();
        assert_eq!(bytes, vec![0x00, 0x00]);
    }

    #[test]
    fn test_build_frame_max_payload() {
        let payload = vec![b'x'; MAX_PAYLOAD_SIZE];
        let bytes = build_frame(&payload).unwrap();
        assert_eq!(&bytes[..LENGTH_PREFIX_SIZE], &[0xFF, 0xFF]);
    }

    #[test]
    fn test_build_frame_rejects_oversized_payload() {
        let payload = vec![b'x'; MAX_PAYLOAD_SIZE + 1];
        let err = build_frame(&payload).unwrap_err();

        assert!(matches!(
            err,
            BridgeError::Framing(FramingError::PayloadTooLarge(65536))
        ));
    }
}
