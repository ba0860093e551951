use crate::error::AuthError;
use std::fmt;

/// Environment variable consulted when no token was passed explicitly.
pub const TOKEN_ENV: &str = "TWITTERTOKEN";

/// A pre-provisioned app-only bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Result<Self, AuthError> {
        let token = token.into();
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::Missing);
        }
        Ok(Self(token.to_string()))
    }

    /// Pick the first usable token from: the explicit argument, the configured
    /// value, then `TWITTERTOKEN`.
    pub fn resolve(explicit: Option<&str>, configured: Option<&str>) -> Result<Self, AuthError> {
        let from_env = std::env::var(TOKEN_ENV).ok();
        Self::resolve_from(explicit, configured, from_env.as_deref())
    }

    fn resolve_from(
        explicit: Option<&str>,
        configured: Option<&str>,
        from_env: Option<&str>,
    ) -> Result<Self, AuthError> {
        let (source, token) = [
            ("argument", explicit),
            ("config", configured),
            ("environment", from_env),
        ]
        .into_iter()
        .find_map(|(source, candidate)| {
            candidate
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| (source, t))
        })
        .ok_or(AuthError::Missing)?;

        tracing::debug!(source, "twitter.credential.resolved");
        Self::new(token)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}
