//! Command dispatcher.
//!
//! Maps each [`Command`] to its boolean outcome:
//!
//! | Command       | Action                         | Outcome       |
//! |---------------|--------------------------------|---------------|
//! | none          | -                              | `false`       |
//! | `auth`        | API call, password as token    | status == 200 |
//! | `isuser`      | -                              | `false`       |
//! | `setpass`     | -                              | `false`       |
//! | `tryregister` | -                              | `true`        |
//! | malformed     | warning                        | `false`       |
//! | unknown       | warning                        | `false`       |
//!
//! Failure details are logged and never reach the reply.

use serde_json::Value;
use tracing::{debug, warn};

use crate::api::ApiCaller;
use crate::command::{Command, Jid};

/// Routes commands and evaluates their outcome.
pub struct Dispatcher {
    api: Box<dyn ApiCaller>,
    endpoint: String,
}

impl Dispatcher {
    /// Create a dispatcher calling `endpoint` through `api` for `auth`.
    pub fn new(api: Box<dyn ApiCaller>, endpoint: impl Into<String>) -> Self {
        Self {
            api,
            endpoint: endpoint.into(),
        }
    }

    /// Compute the outcome for a command.
    pub async fn dispatch(&self, command: &Command) -> bool {
        match command {
            Command::None => false,
            Command::Auth { jid, password } => self.auth(jid, password).await,
            Command::IsUser { jid } => self.is_user(jid),
            Command::SetPass { jid, password } => self.set_pass(jid, password),
            Command::TryRegister => true,
            Command::Malformed(name) => {
                warn!("Malformed ejabberd cmd \"{}\": missing arguments", name);
                false
            }
            Command::Unknown(name) => {
                warn!("Unhandled ejabberd cmd \"{}\"", name);
                false
            }
        }
    }

    /// Authenticate by forwarding the password as bearer token.
    async fn auth(&self, jid: &Jid, password: &str) -> bool {
        debug!("Processing \"auth\" for {} via {}", jid, self.endpoint);
        self.call_api(&self.endpoint, password, None).await
    }

    // User lookup is not backed by the identity service.
    fn is_user(&self, jid: &Jid) -> bool {
        debug!("Processing \"isuser\" for {}", jid);
        false
    }

    // Password changes are not backed by the identity service.
    fn set_pass(&self, jid: &Jid, _password: &str) -> bool {
        debug!("Processing \"setpass\" for {}", jid);
        false
    }

    /// Call the API and evaluate the result.
    async fn call_api(&self, endpoint: &str, token: &str, body: Option<&Value>) -> bool {
        let result = self.api.call(endpoint, token, body).await;
        let success = result.is_success();

        debug!("Success {}", success);
        if !success {
            warn!(
                "Call to API returned without success: code: {} message: {}",
                result.status,
                result.message()
            );
        }

        success
    }
}
