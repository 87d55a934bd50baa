//! Handler module - command dispatch.
//!
//! Provides [`Dispatcher`], which turns a decoded
//! [`Command`](crate::command::Command) into the boolean outcome sent back to
//! the chat server.
//!
//! # Example
//!
//! ```ignore
//! use extauth_bridge::command::Command;
//! use extauth_bridge::handler::Dispatcher;
//!
//! let dispatcher = Dispatcher::new(Box::new(caller), "user/info");
//! let success = dispatcher.dispatch(&Command::parse("auth:alice:example.com:pw")).await;
//! ```

mod dispatcher;

pub use dispatcher::Dispatcher;
