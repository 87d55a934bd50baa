//! Command parsing.
//!
//! A frame payload is a colon-separated list of fields. The first field names
//! the command, the rest are positional arguments:
//!
//! ```text
//! auth:User:Server:Password
//! isuser:User:Server
//! setpass:User:Server:Password
//! tryregister:User:Server:Password
//! ```
//!
//! The password is the last field and is taken verbatim, so a password that
//! contains `:` survives parsing.

use std::fmt;

/// Jabber identifier, `user@host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jid {
    /// Local part.
    pub user: String,
    /// Domain part.
    pub host: String,
}

impl Jid {
    /// Build a JID from its user and host parts.
    pub fn new(user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            host: host.into(),
        }
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.host)
    }
}

/// A decoded request from the chat server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Empty payload or closed input.
    None,
    /// Check a user's password.
    Auth {
        /// User being authenticated.
        jid: Jid,
        /// Submitted password, forwarded as the bearer token.
        password: String,
    },
    /// Check whether a user exists.
    IsUser {
        /// User being looked up.
        jid: Jid,
    },
    /// Change a user's password.
    SetPass {
        /// User whose password changes.
        jid: Jid,
        /// New password.
        password: String,
    },
    /// Register a new user. Arguments are not inspected.
    TryRegister,
    /// A known command without enough arguments.
    Malformed(String),
    /// A command name outside the protocol.
    Unknown(String),
}

impl Command {
    /// Parse a frame payload.
    ///
    /// # Example
    ///
    /// ```
    /// use extauth_bridge::command::{Command, Jid};
    ///
    /// let cmd = Command::parse("isuser:alice:example.com");
    /// assert_eq!(cmd, Command::IsUser { jid: Jid::new("alice", "example.com") });
    /// ```
    pub fn parse(payload: &str) -> Self {
        let (name, args) = payload.split_once(':').unwrap_or((payload, ""));

        match name {
            "" => Self::None,
            "auth" => match split_credentials(args) {
                Some((jid, password)) => Self::Auth { jid, password },
                None => Self::Malformed(name.to_string()),
            },
            "isuser" => {
                let mut fields = args.split(':');
                match (fields.next(), fields.next()) {
                    (Some(user), Some(host)) => Self::IsUser {
                        jid: Jid::new(user, host),
                    },
                    _ => Self::Malformed(name.to_string()),
                }
            }
            "setpass" => match split_credentials(args) {
                Some((jid, password)) => Self::SetPass { jid, password },
                None => Self::Malformed(name.to_string()),
            },
            "tryregister" => Self::TryRegister,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Protocol name of the command, for logging.
    pub fn name(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Auth { .. } => "auth",
            Self::IsUser { .. } => "isuser",
            Self::SetPass { .. } => "setpass",
            Self::TryRegister => "tryregister",
            Self::Malformed(name) | Self::Unknown(name) => name,
        }
    }
}

/// Split `user:host:password`, keeping any `:` inside the password.
fn split_credentials(args: &str) -> Option<(Jid, String)> {
    let mut fields = args.splitn(3, ':');
    let user = fields.next()?;
    let host = fields.next()?;
    let password = fields.next()?;
    Some((Jid::new(user, host), password.to_string()))
}
