//! Password-based provider backed by the server's own login endpoints.

use crate::{AuthProvider, Claims, Credentials, Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

/// Exchanges a username and password for a token via `{api_url}/auth/login`
/// and validates tokens via `{api_url}/auth/validate`.
#[derive(Debug, Clone)]
pub struct InternalAuthProvider {
    client: reqwest::Client,
    api_url: String,
}

impl InternalAuthProvider {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Use an existing HTTP client (shared connection pool, custom timeout).
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into();
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl AuthProvider for InternalAuthProvider {
    async fn authenticate(&self, credentials: &Credentials) -> Result<String> {
        let (Some(username), Some(password)) = (
            credentials.non_empty("username"),
            credentials.non_empty("password"),
        ) else {
            return Err(Error::MissingCredentials(
                "username and password required".into(),
            ));
        };

        debug!(api_url = %self.api_url, "requesting login token");

        let response = self
            .client
            .post(format!("{}/auth/login", self.api_url))
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(|source| Error::Request {
                context: "authentication failed",
                source,
            })?;

        if !response.status().is_success() {
            return Err(Error::Rejected {
                context: "authentication failed",
                status: response.status(),
            });
        }

        let body: LoginResponse = response.json().await.map_err(|source| Error::Request {
            context: "authentication failed",
            source,
        })?;

        body.token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::InvalidResponse("login response carried no token".into()))
    }

    async fn validate_token(&self, token: &str) -> Result<Claims> {
        let response = self
            .client
            .get(format!("{}/auth/validate", self.api_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| Error::Request {
                context: "token validation failed",
                source,
            })?;

        if !response.status().is_success() {
            return Err(Error::Rejected {
                context: "token validation failed",
                status: response.status(),
            });
        }

        let body: Map<String, Value> =
            response.json().await.map_err(|source| Error::Request {
                context: "token validation failed",
                source,
            })?;

        Ok(flatten_claims(body))
    }
}

/// Keep string claims as-is and render everything else as JSON text.
fn flatten_claims(body: Map<String, Value>) -> Claims {
    body.into_iter()
        .map(|(k, v)| match v {
            Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect()
}
