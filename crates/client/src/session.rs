//! Session lifecycle against the server's dashboard endpoints.

use crate::error::TransportError;
use crate::transport::Transport;
use crate::{Error, Result};
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

/// What the server said when a session was started.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionInfo {
    /// Server-issued handle that scopes all later commands.
    pub session_id: String,

    /// Everything else in the response, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionInfo {
    /// Pull the session id out of a start-session response.
    ///
    /// Reads `session_id`, or `client_id` from older servers. The id must
    /// be a non-empty string; otherwise this is a session error.
    pub fn from_response(response: Value) -> Result<Self> {
        let Value::Object(mut extra) = response else {
            return Err(Error::Session(TransportError::MissingSessionId));
        };

        let id = ["session_id", "client_id"]
            .iter()
            .find_map(|key| match extra.get(*key) {
                Some(Value::String(s)) if !s.is_empty() => Some((*key, s.clone())),
                _ => None,
            });

        let Some((key, session_id)) = id else {
            return Err(Error::Session(TransportError::MissingSessionId));
        };
        extra.remove(key);

        Ok(Self { session_id, extra })
    }
}

#[derive(Serialize)]
struct UserInfo<'a> {
    first_name: &'a str,
    last_name: &'a str,
}

/// Starts, ends and inspects server sessions.
///
/// Each call is one request. Failures come back as [`Error::Session`];
/// nothing is retried.
#[derive(Debug, Clone)]
pub struct SessionManager {
    transport: Transport,
}

impl SessionManager {
    /// Wrap a transport for session management calls.
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// The transport session requests go through.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Set or clear the bearer token sent with session requests.
    pub fn set_identity_token(&mut self, token: Option<String>) {
        self.transport.set_identity_token(token);
    }

    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Value> {
        self.transport
            .send(method, segments, body)
            .await
            .map_err(Error::Session)
    }

    /// All sessions the server knows about.
    pub async fn list_sessions(&self) -> Result<Value> {
        self.request::<()>(Method::GET, &["dash", "sessions"], None)
            .await
    }

    /// Ask the server for a new session and return its id.
    ///
    /// A reply without a usable id is [`TransportError::MissingSessionId`].
    pub async fn start_session(&self) -> Result<SessionInfo> {
        let response = self
            .request::<()>(Method::POST, &["dash", "start-session"], None)
            .await?;
        let info = SessionInfo::from_response(response)?;
        info!(session_id = %info.session_id, "session started");
        Ok(info)
    }

    /// Close `session_id` on the server.
    pub async fn end_session(&self, session_id: &str) -> Result<Value> {
        let response = self
            .request::<()>(Method::POST, &["dash", "end-session", session_id], None)
            .await?;
        info!(session_id, "session ended");
        Ok(response)
    }

    /// Tag a session with the name of the user driving it.
    pub async fn update_user_info(
        &self,
        session_id: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Value> {
        self.request(
            Method::POST,
            &["dash", "update-user-info", session_id],
            Some(&UserInfo {
                first_name,
                last_name,
            }),
        )
        .await
    }

    /// Per-session memory figures reported by the server.
    pub async fn memory_usage(&self) -> Result<Value> {
        self.request::<()>(Method::GET, &["dash", "session-memory"], None)
            .await
    }

    /// Server port and worker status.
    pub async fn port_status(&self) -> Result<Value> {
        self.request::<()>(Method::GET, &["dash", "port-status"], None)
            .await
    }
}
