//! The client facade: session manager, command executor and optional
//! authentication provider behind one surface.

use crate::codec::{self, Args};
use crate::command::CommandExecutor;
use crate::config::Config;
use crate::params::{ParamFilter, SetValue};
use crate::session::{SessionInfo, SessionManager};
use crate::transport::Transport;
use crate::{Error, Result};
use phoebe_auth::{AuthProvider, Claims, Credentials};
use serde::Serialize;
use serde_json::{Value, json};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Future returned by the body of [`Client::with_session`].
pub type ScopeFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'c>>;

/// Builder for creating a [`Client`].
#[derive(Clone, Default)]
pub struct ClientBuilder {
    config: Config,
    auth_provider: Option<Arc<dyn AuthProvider>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a loaded configuration. Later setters override it.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.server.timeout = timeout;
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.auth.api_key = api_key.into();
        self
    }

    pub fn auth_provider(self, provider: impl AuthProvider + 'static) -> Self {
        self.shared_auth_provider(Arc::new(provider))
    }

    pub fn shared_auth_provider(mut self, provider: Arc<dyn AuthProvider>) -> Self {
        self.auth_provider = Some(provider);
        self
    }

    /// Build the client. Fails if the API key cannot be sent as a header.
    pub fn build(self) -> Result<Client> {
        let transport = Transport::from_config(&self.config)?;
        Ok(Client {
            sessions: SessionManager::new(transport.clone()),
            commands: CommandExecutor::new(transport),
            auth_provider: self.auth_provider,
            identity_token: None,
        })
    }

    /// Build the client and start a session right away.
    pub async fn connect(self) -> Result<Client> {
        let mut client = self.build()?;
        client.start_session().await?;
        Ok(client)
    }
}

/// PHOEBE client.
///
/// Every method is one request/response round trip. A client binds at
/// most one session at a time; run several clients for several sessions.
///
/// ```ignore
/// use phoebe_client::{Client, ParamFilter};
///
/// # async fn example() -> phoebe_client::Result<()> {
/// let mut client = Client::builder().host("localhost").port(8001).build()?;
/// client
///     .with_session(|c| {
///         Box::pin(async move {
///             c.set_value("period@binary", &1.5).await?;
///             c.run_compute(&()).await
///         })
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Client {
    sessions: SessionManager,
    commands: CommandExecutor,
    auth_provider: Option<Arc<dyn AuthProvider>>,
    identity_token: Option<String>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("transport", self.commands.transport())
            .field("session_id", &self.commands.session_id())
            .field("auth_provider", &self.auth_provider.is_some())
            .field("authenticated", &self.identity_token.is_some())
            .finish()
    }
}

impl Client {
    /// Start configuring a client; unset fields take the config defaults.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Build a client straight from loaded configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        ClientBuilder::new().config(config).build()
    }

    /// Server host name or address.
    pub fn host(&self) -> &str {
        self.commands.transport().host()
    }

    /// Server port.
    pub fn port(&self) -> u16 {
        self.commands.transport().port()
    }

    /// Direct access to the session endpoints (listing, status, user info).
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// The executor holding the bound session id.
    pub fn commands(&self) -> &CommandExecutor {
        &self.commands
    }

    /// The currently bound session id.
    pub fn session_id(&self) -> Option<&str> {
        self.commands.session_id()
    }

    /// The identity token obtained by the last successful `authenticate`.
    pub fn identity_token(&self) -> Option<&str> {
        self.identity_token.as_deref()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Identity
    // ─────────────────────────────────────────────────────────────────────

    /// Obtain an identity token from the configured provider and forward it
    /// on every later request. Replaces any previous token.
    pub async fn authenticate(&mut self, credentials: &Credentials) -> Result<&mut Self> {
        let provider = self
            .auth_provider
            .as_ref()
            .ok_or(phoebe_auth::Error::NotConfigured)?;
        let token = provider.authenticate(credentials).await?;
        info!("authenticated user identity");
        self.set_identity_token(Some(token));
        Ok(self)
    }

    /// Set or clear the identity token without going through a provider.
    pub fn set_identity_token(&mut self, token: Option<String>) {
        self.sessions.set_identity_token(token.clone());
        self.commands.set_identity_token(token.clone());
        self.identity_token = token;
    }

    /// Validate the held identity token and return its claims.
    pub async fn identity(&self) -> Result<Claims> {
        let provider = self
            .auth_provider
            .as_ref()
            .ok_or(phoebe_auth::Error::NotConfigured)?;
        let token = self
            .identity_token
            .as_deref()
            .ok_or(phoebe_auth::Error::NotAuthenticated)?;
        Ok(provider.validate_token(token).await?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Session lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Start a server session and bind it for later commands.
    ///
    /// A previously bound session is replaced, not ended.
    pub async fn start_session(&mut self) -> Result<SessionInfo> {
        let info = self.sessions.start_session().await?;
        if let Some(previous) = self.commands.session_id() {
            warn!(previous, replacement = %info.session_id, "replacing bound session without ending it");
        }
        self.commands.set_session_id(Some(info.session_id.clone()));
        Ok(info)
    }

    /// Start a session and tag it with the user's name.
    pub async fn start_session_for(
        &mut self,
        first_name: &str,
        last_name: &str,
    ) -> Result<SessionInfo> {
        let info = self.start_session().await?;
        self.sessions
            .update_user_info(&info.session_id, first_name, last_name)
            .await?;
        Ok(info)
    }

    /// Start a session unless one is already bound.
    pub async fn ensure_session(&mut self) -> Result<()> {
        if self.session_id().is_none() {
            self.start_session().await?;
        }
        Ok(())
    }

    /// End the bound session on the server and unbind it.
    ///
    /// With no session bound this does nothing. If the server call fails the
    /// session stays bound and the error is returned.
    pub async fn close_session(&mut self) -> Result<()> {
        let Some(session_id) = self.commands.session_id() else {
            return Ok(());
        };
        self.sessions.end_session(session_id).await?;
        self.commands.set_session_id(None);
        Ok(())
    }

    /// Unbind the session locally without telling the server.
    pub fn clear_session(&mut self) {
        self.commands.set_session_id(None);
    }

    /// Run `body` inside a session.
    ///
    /// A session is started first if none is bound. On the way out the
    /// session is always closed, whether `body` succeeded or not. A failure
    /// to close is logged and the session unbound locally; the result of
    /// `body` is returned either way.
    pub async fn with_session<T, F>(&mut self, body: F) -> Result<T>
    where
        F: for<'c> FnOnce(&'c mut Client) -> ScopeFuture<'c, T>,
    {
        self.ensure_session().await?;

        let outcome = body(&mut *self).await;

        if let Err(e) = self.close_session().await {
            warn!(error = %e, "failed to close session on scope exit");
            self.clear_session();
        }

        outcome
    }

    // ─────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────

    /// Run any command in the bound session.
    pub async fn execute(&self, command: &str, args: Args) -> Result<Value> {
        self.commands.execute(command, args).await
    }

    /// Run any command with serializable arguments.
    pub async fn execute_with<A: Serialize + ?Sized>(
        &self,
        command: &str,
        args: &A,
    ) -> Result<Value> {
        self.commands.execute_with(command, args).await
    }

    /// Fetch the parameters matching `filter`.
    pub async fn get_parameter(&self, filter: impl Into<ParamFilter>) -> Result<Value> {
        self.execute_with("get_parameter", &filter.into()).await
    }

    /// Read the value of the parameter matching `filter`.
    pub async fn get_value(&self, filter: impl Into<ParamFilter>) -> Result<Value> {
        self.execute_with("get_value", &filter.into()).await
    }

    /// Set the parameter matching `filter` to `value`.
    pub async fn set_value<V: Serialize + ?Sized>(
        &self,
        filter: impl Into<ParamFilter>,
        value: &V,
    ) -> Result<Value> {
        let filter = filter.into();
        self.execute_with(
            "set_value",
            &SetValue {
                filter: &filter,
                value,
            },
        )
        .await
    }

    /// Add a dataset of `kind`. `options` (dataset name, passband, times,
    /// ...) must serialize to a mapping; a `kind` inside it takes precedence.
    pub async fn add_dataset<O: Serialize + ?Sized>(&self, kind: &str, options: &O) -> Result<Value> {
        let mut args = codec::to_args(options)?;
        args.entry("kind").or_insert_with(|| json!(kind));
        self.execute("add_dataset", args).await
    }

    /// Drop a dataset by its label.
    pub async fn remove_dataset(&self, dataset: &str) -> Result<Value> {
        self.execute_with("remove_dataset", &json!({ "dataset": dataset }))
            .await
    }

    /// Run the forward model. `options` must serialize to a mapping, or
    /// pass `&()` for none.
    pub async fn run_compute<O: Serialize + ?Sized>(&self, options: &O) -> Result<Value> {
        self.execute_with("run_compute", options).await
    }

    /// Run a solver. `options` must serialize to a mapping, or pass `&()`
    /// for none.
    pub async fn run_solver<O: Serialize + ?Sized>(&self, options: &O) -> Result<Value> {
        self.execute_with("run_solver", options).await
    }

    /// The full bundle held by the bound session.
    pub async fn get_bundle(&self) -> Result<Value> {
        self.execute("get_bundle", Args::new()).await
    }

    /// Replace the session's bundle with a serialized one.
    pub async fn load_bundle(&self, bundle: &str) -> Result<Value> {
        self.execute_with("load_bundle", &json!({ "bundle": bundle }))
            .await
    }

    /// Serialize the session's bundle. The blob comes back in the response.
    pub async fn save_bundle(&self) -> Result<Value> {
        self.execute("save_bundle", Args::new()).await
    }
}
