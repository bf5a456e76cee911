//! Externally issued signed-token provider.
//!
//! Tokens are verified locally against a configured key, issuer, audience
//! and set of accepted algorithms. No network call is made to validate.
//! If an issuing endpoint is configured, credentials without a token are
//! exchanged there first.

use crate::{AuthProvider, Claims, Credentials, Error, Result};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Algorithm accepted when none is configured.
pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::RS256;

#[derive(Clone, Deserialize)]
struct IdentityClaims {
    sub: Option<Value>,
    preferred_username: Option<Value>,
    email: Option<Value>,
}

#[derive(Deserialize)]
struct IssuedToken {
    access_token: Option<String>,
    token: Option<String>,
}

/// Verifies signed tokens issued by an external identity provider.
///
/// ```ignore
/// use phoebe_auth::JwtAuthProvider;
///
/// let provider = JwtAuthProvider::from_rsa_pem(PUBLIC_KEY_PEM, "https://idp.example", "phoebe")?
///     .token_url("https://idp.example/token");
/// ```
#[derive(Clone)]
pub struct JwtAuthProvider {
    client: reqwest::Client,
    key: DecodingKey,
    issuer: String,
    audience: String,
    algorithms: Vec<Algorithm>,
    leeway: Duration,
    token_url: Option<String>,
}

impl std::fmt::Debug for JwtAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthProvider")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("algorithms", &self.algorithms)
            .field("leeway", &self.leeway)
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

impl JwtAuthProvider {
    pub fn new(key: DecodingKey, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            key,
            issuer: issuer.into(),
            audience: audience.into(),
            algorithms: vec![DEFAULT_ALGORITHM],
            leeway: Duration::ZERO,
            token_url: None,
        }
    }

    /// Verify with an RSA public key in PEM form.
    pub fn from_rsa_pem(
        pem: &[u8],
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self> {
        let key = DecodingKey::from_rsa_pem(pem).map_err(Error::InvalidKey)?;
        Ok(Self::new(key, issuer, audience))
    }

    /// Verify with an EC public key in PEM form. Accepts `ES256` only
    /// unless [`algorithms`](Self::algorithms) says otherwise.
    pub fn from_ec_pem(
        pem: &[u8],
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self> {
        let key = DecodingKey::from_ec_pem(pem).map_err(Error::InvalidKey)?;
        Ok(Self::new(key, issuer, audience).algorithms([Algorithm::ES256]))
    }

    /// Verify with a shared HMAC secret. Accepts `HS256` only unless
    /// [`algorithms`](Self::algorithms) says otherwise.
    pub fn from_secret(
        secret: &[u8],
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self::new(DecodingKey::from_secret(secret), issuer, audience)
            .algorithms([Algorithm::HS256])
    }

    /// Replace the accepted signing algorithms. An empty list is ignored.
    pub fn algorithms(mut self, algorithms: impl IntoIterator<Item = Algorithm>) -> Self {
        let algorithms: Vec<Algorithm> = algorithms.into_iter().collect();
        if !algorithms.is_empty() {
            self.algorithms = algorithms;
        }
        self
    }

    /// Clock skew tolerated when checking `exp` and `nbf`. Defaults to none.
    pub fn leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Endpoint that exchanges credentials for a token.
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    /// Use an existing HTTP client for the token exchange.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Issuer and audience are required; `exp` is checked only when present.
    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithms[0]);
        validation.algorithms = self.algorithms.clone();
        validation.leeway = self.leeway.as_secs();
        validation.set_required_spec_claims(&["iss", "aud"]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation
    }

    async fn exchange(&self, url: &str, credentials: &Credentials) -> Result<String> {
        debug!(token_url = %url, "exchanging credentials for token");

        let response = self
            .client
            .post(url)
            .json(credentials.as_map())
            .send()
            .await
            .map_err(|source| Error::Request {
                context: "failed to obtain token",
                source,
            })?;

        if !response.status().is_success() {
            return Err(Error::Rejected {
                context: "failed to obtain token",
                status: response.status(),
            });
        }

        let issued: IssuedToken = response.json().await.map_err(|source| Error::Request {
            context: "failed to obtain token",
            source,
        })?;

        issued
            .access_token
            .or(issued.token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::InvalidResponse("token endpoint returned no token".into()))
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    async fn authenticate(&self, credentials: &Credentials) -> Result<String> {
        if let Some(token) = credentials.get("token") {
            self.validate_token(token).await?;
            return Ok(token.to_string());
        }

        match &self.token_url {
            Some(url) => self.exchange(url, credentials).await,
            None => Err(Error::NoTokenSource),
        }
    }

    async fn validate_token(&self, token: &str) -> Result<Claims> {
        let data = decode::<IdentityClaims>(token, &self.key, &self.validation())
            .map_err(Error::InvalidToken)?;
        let claims = data.claims;

        Ok(Claims::from([
            ("user_id".to_string(), claim_string(claims.sub)),
            ("username".to_string(), claim_string(claims.preferred_username)),
            ("email".to_string(), claim_string(claims.email)),
        ]))
    }
}

fn claim_string(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}
