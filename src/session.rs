//! Bridge runtime loop.
//!
//! The [`Bridge`] owns the request/response loop:
//! 1. Read one frame from the chat server
//! 2. Parse it into a [`Command`]
//! 3. Dispatch it (calling the identity service for `auth`)
//! 4. Write exactly one reply frame
//!
//! The loop runs until the shutdown future resolves or the input stream
//! breaks its framing. Closed input is answered like an empty command unless
//! the bridge was configured to exit on EOF.
//!
//! # Example
//!
//! ```ignore
//! use extauth_bridge::config::BridgeConfig;
//! use extauth_bridge::Bridge;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> extauth_bridge::error::Result<()> {
//!     let bridge = Bridge::new(&BridgeConfig::default())?;
//!     let end = bridge.run_stdio(async {
//!         tokio::signal::ctrl_c().await.ok();
//!     }).await?;
//!     eprintln!("session ended: {end}");
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::future::Future;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::api::{ApiCaller, HttpApiCaller};
use crate::command::Command;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::handler::Dispatcher;
use crate::protocol::{FramedChannel, ReadOutcome};

/// Why a session stopped.
#[derive(Debug)]
pub enum SessionEnd {
    /// The shutdown signal fired.
    Interrupted,
    /// Input closed and the bridge is configured to exit on EOF.
    InputClosed,
    /// The input stream broke framing or failed to read.
    InputFailed(BridgeError),
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupted => f.write_str("interrupted"),
            Self::InputClosed => f.write_str("input closed"),
            Self::InputFailed(e) => write!(f, "input error: {}", e),
        }
    }
}

/// Result of one loop iteration before the reply is written.
enum Step {
    Reply(bool),
    Stop(SessionEnd),
}

/// A configured bridge, ready to serve a session.
pub struct Bridge {
    dispatcher: Dispatcher,
    exit_on_eof: bool,
}

impl Bridge {
    /// Create a bridge calling the identity service over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        let caller = HttpApiCaller::new(config)?;
        Ok(Self::with_caller(config, Box::new(caller)))
    }

    /// Create a bridge with a custom [`ApiCaller`].
    pub fn with_caller(config: &BridgeConfig, caller: Box<dyn ApiCaller>) -> Self {
        Self {
            dispatcher: Dispatcher::new(caller, config.endpoint()),
            exit_on_eof: config.exit_on_eof(),
        }
    }

    /// Serve the chat server over process stdin/stdout.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a reply cannot be written.
    pub async fn run_stdio<S>(&self, shutdown: S) -> Result<SessionEnd>
    where
        S: Future<Output = ()>,
    {
        let mut channel = FramedChannel::stdio();
        self.run(&mut channel, shutdown).await
    }

    /// Serve frames from `channel` until `shutdown` resolves or input fails.
    ///
    /// Every decoded command gets exactly one reply. An interrupt yields no
    /// reply for the command in flight.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a reply cannot be written. Input failures are
    /// not errors; they end the session with [`SessionEnd::InputFailed`].
    pub async fn run<R, W, S>(&self, channel: &mut FramedChannel<R, W>, shutdown: S) -> Result<SessionEnd>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let step = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("Terminating by user input");
                    return Ok(SessionEnd::Interrupted);
                }
                step = self.next_step(channel) => step,
            };

            match step {
                Step::Reply(success) => channel.write_reply(success).await?,
                Step::Stop(end) => return Ok(end),
            }
        }
    }

    /// Read and dispatch one frame.
    async fn next_step<R, W>(&self, channel: &mut FramedChannel<R, W>) -> Step
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let command = match channel.read_frame().await {
            Ok(ReadOutcome::Frame(frame)) => Command::parse(&frame.text()),
            Ok(ReadOutcome::EndOfInput) if self.exit_on_eof => {
                tracing::info!("Input closed, exiting");
                return Step::Stop(SessionEnd::InputClosed);
            }
            Ok(ReadOutcome::EndOfInput) => {
                tracing::warn!("ejabberd called with invalid input");
                Command::None
            }
            Err(e) => {
                tracing::warn!("Input error: {}", e);
                return Step::Stop(SessionEnd::InputFailed(e));
            }
        };

        tracing::debug!("Dispatching \"{}\"", command.name());
        Step::Reply(self.dispatcher.dispatch(&command).await)
    }
}
