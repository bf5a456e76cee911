//! Authentication providers for the PHOEBE client.
//!
//! A provider turns credentials into a user identity token and checks
//! tokens it is handed. Two providers ship with the crate:
//!
//! - [`InternalAuthProvider`]: username/password login against the
//!   server's own auth endpoints.
//! - [`JwtAuthProvider`] (feature `jwt`): local verification of tokens
//!   signed by an external identity provider.
//!
//! The identity token is forwarded to the server for auditing only.
//! Authorization to use the server is a separate, static API key handled
//! by the client transport.

mod error;
mod internal;
#[cfg(feature = "jwt")]
mod jwt;
mod provider;

pub use error::{Error, Result};
pub use internal::InternalAuthProvider;
#[cfg(feature = "jwt")]
pub use jwt::{DEFAULT_ALGORITHM, JwtAuthProvider};
pub use provider::{AuthProvider, Claims, Credentials};

#[cfg(feature = "jwt")]
pub use jsonwebtoken::Algorithm;
