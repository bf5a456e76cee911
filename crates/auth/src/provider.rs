//! The authentication provider capability.

use crate::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Claims extracted from a validated token, keyed by claim name.
pub type Claims = BTreeMap<String, String>;

/// Credentials handed to a provider.
///
/// The expected keys depend on the provider: `username`/`password` for
/// [`InternalAuthProvider`](crate::InternalAuthProvider), `token` for an
/// already-issued signed token, or whatever payload a token issuing
/// endpoint accepts.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials(BTreeMap<String, String>);

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Username and password pair.
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new()
            .with("username", username)
            .with("password", password)
    }

    /// A token issued elsewhere.
    pub fn token(token: impl Into<String>) -> Self {
        Self::new().with("token", token)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Like [`get`](Self::get), but treats an empty value as absent.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Credentials {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// Values are secrets; only the keys are shown.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

/// A source of user identity tokens.
///
/// The token a provider issues identifies the user to the server for
/// auditing. Server authorization is a separate static API key.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange credentials for a token.
    async fn authenticate(&self, credentials: &Credentials) -> Result<String>;

    /// Check a token and return the claims it carries.
    async fn validate_token(&self, token: &str) -> Result<Claims>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_values() {
        let creds = Credentials::password("alice", "hunter2");
        let shown = format!("{creds:?}");
        assert!(shown.contains("username"));
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("alice"));
    }

    #[test]
    fn non_empty_skips_blank_values() {
        let creds = Credentials::new().with("username", "").with("password", "x");
        assert_eq!(creds.non_empty("username"), None);
        assert_eq!(creds.non_empty("password"), Some("x"));
        assert_eq!(creds.non_empty("token"), None);
    }

    #[test]
    fn collects_from_pairs() {
        let creds: Credentials = [("code", "abc"), ("redirect_uri", "http://x")]
            .into_iter()
            .collect();
        assert_eq!(creds.get("code"), Some("abc"));
        assert_eq!(creds.as_map().len(), 2);
    }
}
