//! Bearer token state shared by auth and signing

use std::fmt;

/// Authenticated session against a Vault server
///
/// Starts out empty (unless seeded from the environment) and is populated at
/// most once per run by [`AuthMethod::ensure_authenticated`](crate::AuthMethod::ensure_authenticated).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    /// Create a session without a token
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session carrying a pre-supplied token
    pub fn with_token(token: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.set_token(token);
        session
    }

    /// Create a session from an optional token, treating an empty string as absent
    pub fn from_optional(token: Option<String>) -> Self {
        token.map(Self::with_token).unwrap_or_default()
    }

    /// The bearer token, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Whether the session carries a non-empty token
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Store a token; empty strings clear the session
    pub fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.token = if token.is_empty() { None } else { Some(token) };
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
