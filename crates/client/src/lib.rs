//! PHOEBE client — typed access to a remote PHOEBE server.
//!
//! The server keeps one PHOEBE bundle per session and exposes it through a
//! single command endpoint. This crate manages the session, shapes command
//! arguments, and maps transport failures to error kinds.
//!
//! # Overview
//!
//! - **Transport**: host, port, timeout and headers. The static API key
//!   authorizes requests; an optional bearer token identifies the user.
//! - **SessionManager**: start, end, list and inspect server sessions.
//! - **CommandExecutor**: `execute(command, args)` against the bound session.
//! - **Client**: the above plus an optional [`AuthProvider`], with scoped
//!   session handling and named wrappers for common commands.
//!
//! # Example
//!
//! ```ignore
//! use phoebe_client::{Client, Config, ParamFilter};
//!
//! # async fn example() -> phoebe_client::Result<()> {
//! let config = Config::load_or_default("phoebe.toml")?;
//! let mut client = Client::from_config(config)?;
//!
//! client.start_session().await?;
//! client
//!     .set_value(ParamFilter::new().qualifier("period").component("binary"), &1.5)
//!     .await?;
//! let result = client.run_compute(&()).await?;
//! println!("success: {}", result["success"]);
//! client.close_session().await?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod codec;
mod command;
pub mod config;
mod error;
mod params;
mod session;
mod transport;

// Facade
pub use client::{Client, ClientBuilder, ScopeFuture};

// Components
pub use command::{COMMAND_KEY, CommandExecutor, payload};
pub use session::{SessionInfo, SessionManager};
pub use transport::{API_KEY_HEADER, Transport};

// Arguments
pub use codec::Args;
pub use params::ParamFilter;

// Configuration
pub use config::{AuthConfig, Config, ConfigError, ServerConfig};

// Error types
pub use error::{Error, Result, TransportError};

// Authentication
pub use phoebe_auth::{AuthProvider, Claims, Credentials, InternalAuthProvider};
#[cfg(feature = "jwt")]
pub use phoebe_auth::JwtAuthProvider;
