//! Connection plumbing shared by the session manager and command executor.
//!
//! Holds the server address, timeout and credentials, and turns them into
//! request URLs and headers. Header derivation does no I/O.

use crate::Config;
use crate::config::{ConfigError, ServerConfig};
use crate::error::TransportError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the static server API key.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Server address, timeout and credentials for one component.
#[derive(Clone)]
pub struct Transport {
    http: reqwest::Client,
    server: ServerConfig,
    api_key: Option<HeaderValue>,
    identity_token: Option<String>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("server", &self.server)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field(
                "identity_token",
                &self.identity_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Transport {
    /// Create a transport for `server`. An empty `api_key` is treated as no
    /// key; a key that cannot be sent as a header value is rejected here.
    pub fn new(server: ServerConfig, api_key: Option<&str>) -> Result<Self, ConfigError> {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .map(|key| {
                let mut value =
                    HeaderValue::from_str(key).map_err(|_| ConfigError::InvalidApiKey)?;
                value.set_sensitive(true);
                Ok::<_, ConfigError>(value)
            })
            .transpose()?;

        Ok(Self {
            http: reqwest::Client::new(),
            server,
            api_key,
            identity_token: None,
        })
    }

    /// Create a transport from the `[server]` and `[auth]` sections.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(config.server.clone(), config.auth.api_key())
    }

    /// `http://{host}:{port}`.
    pub fn base_url(&self) -> String {
        self.server.base_url()
    }

    /// Server host name or address.
    pub fn host(&self) -> &str {
        &self.server.host
    }

    /// Server port.
    pub fn port(&self) -> u16 {
        self.server.port
    }

    /// Timeout applied to every request.
    pub fn timeout(&self) -> Duration {
        self.server.timeout
    }

    /// Set or clear the user identity token forwarded as a bearer header.
    ///
    /// The server authorizes on the API key; this token only identifies
    /// the user for auditing.
    pub fn set_identity_token(&mut self, token: Option<String>) {
        self.identity_token = token;
    }

    /// The identity token currently forwarded, if any.
    pub fn identity_token(&self) -> Option<&str> {
        self.identity_token.as_deref()
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(key) = &self.api_key {
            headers.insert(API_KEY_HEADER, key.clone());
        }

        if let Some(token) = &self.identity_token {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("identity token is not a valid header value; not sent"),
            }
        }

        headers
    }

    /// `base_url` joined with percent-encoded path segments.
    pub fn url(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = Url::parse(&self.base_url())
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| TransportError::InvalidUrl(self.base_url()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send one request and return the decoded JSON body.
    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Value, TransportError> {
        let url = self.url(segments)?;
        debug!(%method, path = url.path(), "sending request");

        let mut req = self
            .http
            .request(method, url)
            .headers(self.headers())
            .timeout(self.server.timeout);
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(TransportError::Network)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TransportError::Unauthorized { status });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        response.json().await.map_err(TransportError::Decode)
    }
}
