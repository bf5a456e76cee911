//! Client error types.

use crate::config::ConfigError;
use reqwest::StatusCode;
use thiserror::Error;

/// Why a request to the server failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The server refused the API key (401 or 403).
    #[error("server authorization failed (status {status}); check the configured API key")]
    Unauthorized { status: StatusCode },

    /// Any other non-success status.
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Connection refused, timeout, and other failures below HTTP.
    #[error("network: {0}")]
    Network(#[source] reqwest::Error),

    /// A start-session reply succeeded but carried no usable session id.
    #[error("start-session response carried no session id")]
    MissingSessionId,

    /// The configured host and port do not form a usable URL.
    #[error("invalid server URL: {0}")]
    InvalidUrl(String),

    /// The response body was not the JSON we expected.
    #[error("invalid response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl TransportError {
    /// Whether the server rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// The HTTP status, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { status } | Self::Status { status, .. } => Some(*status),
            Self::Network(e) | Self::Decode(e) => e.status(),
            Self::InvalidUrl(_) | Self::MissingSessionId => None,
        }
    }
}

/// Client errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An authentication provider failed, or none is configured.
    #[error("authentication failed: {0}")]
    Auth(#[from] phoebe_auth::Error),

    /// A session lifecycle request failed.
    #[error("session request failed: {0}")]
    Session(#[source] TransportError),

    /// A command request failed.
    #[error("command failed: {0}")]
    Command(#[source] TransportError),

    /// A command was issued with no session bound.
    ///
    /// This is caller misuse, not a server problem; no request was sent.
    #[error("no session bound; start a session before executing commands")]
    NoSession,

    /// Command arguments could not be converted to JSON.
    #[error("invalid command arguments: {0}")]
    InvalidArgs(#[from] serde_json::Error),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Whether the server rejected our credentials, in either a session or
    /// a command request.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Session(e) | Self::Command(e) => e.is_unauthorized(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
