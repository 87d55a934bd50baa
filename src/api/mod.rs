//! API module - calls to the remote identity service.
//!
//! Provides:
//! - [`ApiCaller`] - one authenticated call, normalized to an [`ApiResult`]
//! - [`HttpApiCaller`] - `reqwest` implementation of [`ApiCaller`]
//!
//! # Example
//!
//! ```ignore
//! use extauth_bridge::api::{ApiCaller, HttpApiCaller};
//! use extauth_bridge::config::BridgeConfig;
//!
//! let config = BridgeConfig::builder().base_url("https://id.example.com").build()?;
//! let caller = HttpApiCaller::new(&config)?;
//!
//! let result = caller.call("user/info", "secret", None).await;
//! assert!(result.is_success());
//! ```

mod caller;
mod http;
mod result;

pub use caller::{ApiCaller, BoxFuture};
pub use http::{join_url, HttpApiCaller};
pub use result::{ApiResult, SUCCESS_STATUS, TRANSPORT_ERROR_STATUS};
