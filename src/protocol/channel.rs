//! Framed channel over a pair of byte streams.
//!
//! Reads one length-prefixed frame at a time and writes fixed 4-byte
//! replies. The channel is generic over `AsyncRead`/`AsyncWrite`, so the
//! same code runs against process stdio and in-memory buffers.
//!
//! Reads never go past the end of the current frame: the prefix and the
//! payload are each read with exact-size buffers, and nothing is buffered
//! ahead.
//!
//! # Example
//!
//! ```ignore
//! use extauth_bridge::protocol::{FramedChannel, ReadOutcome};
//!
//! let mut channel = FramedChannel::stdio();
//! if let ReadOutcome::Frame(frame) = channel.read_frame().await? {
//!     channel.write_reply(true).await?;
//! }
//! ```

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, Stdin, Stdout};

use super::frame::{Frame, ReadOutcome};
use super::wire_format::{decode_length, encode_reply, LENGTH_PREFIX_SIZE};
use crate::error::{FramingError, Result};

/// Reader/writer pair speaking the length-prefixed protocol.
pub struct FramedChannel<R, W> {
    reader: R,
    writer: W,
}

impl FramedChannel<Stdin, Stdout> {
    /// Channel over process stdin/stdout.
    ///
    /// stdout carries protocol replies only; logs must go elsewhere.
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<R, W> FramedChannel<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a channel from a reader and a writer.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Read exactly one frame.
    ///
    /// # Returns
    ///
    /// - `Ok(ReadOutcome::Frame(_))` for a complete frame
    /// - `Ok(ReadOutcome::EndOfInput)` if the stream closed before the first
    ///   prefix byte
    ///
    /// # Errors
    ///
    /// Returns a [`FramingError`] if the stream closes inside the prefix or
    /// the payload, or an I/O error from the underlying reader.
    pub async fn read_frame(&mut self) -> Result<ReadOutcome> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        let got = read_full(&mut self.reader, &mut prefix).await?;

        if got == 0 {
            tracing::debug!("Input stream closed");
            return Ok(ReadOutcome::EndOfInput);
        }
        if got < LENGTH_PREFIX_SIZE {
            return Err(FramingError::IncompleteLengthPrefix.into());
        }

        let length = decode_length(&prefix).map_or(0, usize::from);
        let mut payload = BytesMut::zeroed(length);
        let got = read_full(&mut self.reader, &mut payload).await?;

        if got < length {
            return Err(FramingError::IncompletePayload {
                expected: length,
                received: got,
            }
            .into());
        }

        tracing::debug!("Read {} bytes", LENGTH_PREFIX_SIZE + length);
        Ok(ReadOutcome::Frame(Frame::new(payload.freeze())))
    }

    /// Write the reply frame for an outcome and flush it.
    ///
    /// # Errors
    ///
    /// Returns IO error if write or flush fails.
    pub async fn write_reply(&mut self, success: bool) -> Result<()> {
        let reply = encode_reply(success);
        self.writer.write_all(&reply).await?;
        self.writer.flush().await?;

        tracing::debug!(
            "Wrote {} bytes, returned {} success",
            reply.len(),
            if success { "with" } else { "without" }
        );
        Ok(())
    }

    /// Consume the channel, returning the reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

/// Fill `buf` from `reader`, stopping early only at end of input.
///
/// Returns the number of bytes read, which is less than `buf.len()` only if
/// the stream closed.
async fn read_full<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
