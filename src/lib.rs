//! # extauth-bridge
//!
//! External authentication program for ejabberd, backed by an HTTP identity
//! service.
//!
//! ejabberd (with `auth_method: external`) spawns this process and talks to
//! it over stdin/stdout. Each request is a length-prefixed frame such as
//! `auth:alice:example.com:secret`; each answer is a fixed 4-byte frame
//! carrying `1` (success) or `0` (failure).
//!
//! ## Architecture
//!
//! - **Protocol** ([`protocol`]): 2-byte Big Endian framing over any
//!   `AsyncRead`/`AsyncWrite` pair
//! - **Commands** ([`command`]): payload parsing into [`Command`]
//! - **Dispatch** ([`handler`]): command → boolean outcome
//! - **API** ([`api`]): one authenticated HTTP call per `auth`, password sent
//!   as bearer token
//! - **Session** ([`Bridge`]): the read → dispatch → reply loop
//!
//! ## Example
//!
//! ```ignore
//! use extauth_bridge::config::BridgeConfig;
//! use extauth_bridge::Bridge;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> extauth_bridge::error::Result<()> {
//!     let config = BridgeConfig::builder()
//!         .base_url("https://id.example.com/auth")
//!         .endpoint("user/info")
//!         .build()?;
//!
//!     let bridge = Bridge::new(&config)?;
//!     bridge.run_stdio(async { tokio::signal::ctrl_c().await.ok(); }).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod command;
pub mod config;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod telemetry;

mod session;

pub use command::{Command, Jid};
pub use error::{BridgeError, FramingError};
pub use session::{Bridge, SessionEnd};
