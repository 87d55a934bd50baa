//! The seam between command dispatch and the HTTP transport.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use super::ApiResult;

/// Boxed future for caller results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Performs one authenticated call against the identity service.
///
/// Implementations never fail: every transport or HTTP error is folded into
/// the returned [`ApiResult`].
pub trait ApiCaller: Send + Sync {
    /// Call `endpoint` with `token` as bearer credential and an optional
    /// JSON body.
    fn call<'a>(
        &'a self,
        endpoint: &'a str,
        token: &'a str,
        body: Option<&'a Value>,
    ) -> BoxFuture<'a, ApiResult>;
}
