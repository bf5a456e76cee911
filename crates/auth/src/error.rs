//! Authentication error types.

use thiserror::Error;

/// Authentication errors.
///
/// Every variant is an authentication failure from the caller's point of
/// view; the underlying cause, when there is one, is reachable through
/// [`std::error::Error::source`].
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Required credential fields were absent or empty.
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    /// Credentials carried no token and no issuing endpoint is configured.
    #[error("no token provided and no token issuing endpoint configured")]
    NoTokenSource,

    /// The client has no authentication provider.
    #[error("no authentication provider configured")]
    NotConfigured,

    /// No identity token is held; authenticate first.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The remote call could not be completed.
    #[error("{context}: {source}")]
    Request {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The remote side answered with a non-success status.
    #[error("{context}: server returned {status}")]
    Rejected {
        context: &'static str,
        status: reqwest::StatusCode,
    },

    /// The remote side answered, but not with something usable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The verification key could not be parsed.
    #[cfg(feature = "jwt")]
    #[error("invalid verification key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    /// The token failed signature, issuer, audience, algorithm or expiry checks.
    #[cfg(feature = "jwt")]
    #[error("invalid token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
