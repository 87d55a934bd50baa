//! Wire format encoding and decoding.
//!
//! Inbound frames carry a 2-byte length prefix followed by the payload:
//! ```text
//! ┌──────────┬────────────────────────────┐
//! │ Length   │ Payload                    │
//! │ 2 bytes  │ `Length` bytes, ASCII text │
//! │ uint16 BE│ colon-separated fields     │
//! └──────────┴────────────────────────────┘
//! ```
//!
//! Every reply is a fixed 4-byte frame: length `2`, then `1` (success) or
//! `0` (failure). All multi-byte integers are Big Endian.

/// Length prefix size in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// Largest payload a 16-bit length prefix can announce.
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

/// Reply frame size in bytes (prefix + 2-byte result).
pub const REPLY_SIZE: usize = 4;

/// Payload length announced by every reply frame.
pub const REPLY_PAYLOAD_LENGTH: u16 = 2;

/// Result value for a successful operation.
pub const REPLY_SUCCESS: u16 = 1;

/// Result value for a failed or unhandled operation.
pub const REPLY_FAILURE: u16 = 0;

/// Encode a payload length as a Big Endian prefix.
#[inline]
pub fn encode_length(length: u16) -> [u8; LENGTH_PREFIX_SIZE] {
    length.to_be_bytes()
}

/// Decode a Big Endian length prefix.
///
/// Returns `None` if buffer is too short.
///
/// # Example
///
/// ```
/// use extauth_bridge::protocol::decode_length;
///
/// assert_eq!(decode_length(&[0x01, 0x00]), Some(256));
/// assert_eq!(decode_length(&[0x01]), None);
/// ```
#[inline]
pub fn decode_length(buf: &[u8]) -> Option<u16> {
    match buf {
        [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
        _ => None,
    }
}

/// Encode the reply frame for an operation outcome.
///
/// # Example
///
/// ```
/// use extauth_bridge::protocol::encode_reply;
///
/// assert_eq!(encode_reply(true), [0, 2, 0, 1]);
/// assert_eq!(encode_reply(false), [0, 2, 0, 0]);
/// ```
pub fn encode_reply(success: bool) -> [u8; REPLY_SIZE] {
    let value = if success { REPLY_SUCCESS } else { REPLY_FAILURE };
    let mut buf = [0u8; REPLY_SIZE];
    buf[..LENGTH_PREFIX_SIZE].copy_from_slice(&encode_length(REPLY_PAYLOAD_LENGTH));
    buf[LENGTH_PREFIX_SIZE..].copy_from_slice(&value.to_be_bytes());
    buf
}

/// Decode a reply frame back into the operation outcome.
///
/// Returns `None` unless `buf` is exactly a well-formed reply: length `2`
/// followed by `0` or `1`.
pub fn decode_reply(buf: &[u8]) -> Option<bool> {
    if buf.len() != REPLY_SIZE || decode_length(buf)? != REPLY_PAYLOAD_LENGTH {
        return None;
    }
    match decode_length(&buf[LENGTH_PREFIX_SIZE..])? {
        REPLY_SUCCESS => Some(true),
        REPLY_FAILURE => Some(false),
        _ => None,
    }
}
