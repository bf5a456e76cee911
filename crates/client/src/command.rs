//! Command execution over the unified `/send/{session_id}` endpoint.

use crate::codec::{self, Args};
use crate::transport::Transport;
use crate::{Error, Result};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Key under which the command name travels in the request body.
pub const COMMAND_KEY: &str = "command";

/// Build a request body: the arguments plus the command name.
///
/// The command name always wins; a `command` key in `args` is overwritten.
pub fn payload(command: &str, mut args: Args) -> Args {
    args.insert(COMMAND_KEY.to_string(), Value::String(command.to_string()));
    args
}

/// Runs named commands against one bound session.
///
/// At most one session id is bound at a time. With none bound, every
/// command fails with [`Error::NoSession`] before anything is sent.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    transport: Transport,
    session_id: Option<String>,
}

impl CommandExecutor {
    /// Wrap a transport with no session bound.
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            session_id: None,
        }
    }

    /// The transport commands are sent over.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// The bound session id, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Bind a session id, replacing any previous one, or clear it.
    pub fn set_session_id(&mut self, session_id: Option<String>) {
        self.session_id = session_id;
    }

    pub fn set_identity_token(&mut self, token: Option<String>) {
        self.transport.set_identity_token(token);
    }

    /// Run `command` with an argument mapping and return the server's
    /// response unchanged.
    pub async fn execute(&self, command: &str, args: Args) -> Result<Value> {
        let session_id = self.session_id.as_deref().ok_or(Error::NoSession)?;
        self.dispatch(session_id, command, args).await
    }

    /// Like [`execute`](Self::execute), with any serializable argument
    /// value. It must serialize to a mapping (or unit for no arguments).
    pub async fn execute_with<A: Serialize + ?Sized>(
        &self,
        command: &str,
        args: &A,
    ) -> Result<Value> {
        let session_id = self.session_id.as_deref().ok_or(Error::NoSession)?;
        let args = codec::to_args(args)?;
        self.dispatch(session_id, command, args).await
    }

    async fn dispatch(&self, session_id: &str, command: &str, args: Args) -> Result<Value> {
        let body = codec::normalize(&payload(command, args))?;
        debug!(session_id, command, "executing command");

        self.transport
            .send(Method::POST, &["send", session_id], Some(&body))
            .await
            .map_err(Error::Command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use serde_json::json;

    fn executor() -> CommandExecutor {
        CommandExecutor::new(Transport::new(ServerConfig::default(), None).unwrap())
    }

    #[test]
    fn command_key_always_wins() {
        let Value::Object(args) = json!({"command": "sneaky", "x": 1}) else {
            unreachable!()
        };
        let body = payload("set_value", args);
        assert_eq!(Value::Object(body), json!({"command": "set_value", "x": 1}));
    }

    #[test]
    fn session_binding_replaces() {
        let mut exec = executor();
        assert_eq!(exec.session_id(), None);
        exec.set_session_id(Some("a".into()));
        exec.set_session_id(Some("b".into()));
        assert_eq!(exec.session_id(), Some("b"));
        exec.set_session_id(None);
        assert_eq!(exec.session_id(), None);
    }

    #[tokio::test]
    async fn unbound_execute_is_local_error() {
        let exec = executor();
        assert!(matches!(
            exec.execute("save_bundle", Args::new()).await,
            Err(Error::NoSession)
        ));
        assert!(matches!(
            exec.execute_with("run_compute", &()).await,
            Err(Error::NoSession)
        ));
    }

    #[tokio::test]
    async fn unbound_check_precedes_argument_errors() {
        let exec = executor();
        assert!(matches!(
            exec.execute_with("run_compute", &vec![1, 2]).await,
            Err(Error::NoSession)
        ));
    }
}
