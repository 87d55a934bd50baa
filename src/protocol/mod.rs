//! Protocol module - wire format, frames, and the framed channel.
//!
//! This module implements the ejabberd external auth protocol:
//! - 2-byte Big Endian length prefix encoding/decoding
//! - Fixed 4-byte reply frames
//! - Framed channel over generic async byte streams

mod channel;
mod frame;
mod wire_format;

pub use channel::FramedChannel;
pub use frame::{build_frame, Frame, ReadOutcome};
pub use wire_format::{
    decode_length, decode_reply, encode_length, encode_reply, LENGTH_PREFIX_SIZE,
    MAX_PAYLOAD_SIZE, REPLY_FAILURE, REPLY_PAYLOAD_LENGTH, REPLY_SIZE, REPLY_SUCCESS,
};
