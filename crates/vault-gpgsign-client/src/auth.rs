//! Authentication strategies
//!
//! Two methods are supported:
//!
//! - **Token**: the token is supplied out-of-band (usually `VAULT_TOKEN`) and
//!   seeded into the [`Session`] before the first request. This strategy never
//!   contacts the server itself.
//! - **AppRole**: exchanges a role ID and optional secret ID for a token at
//!   `auth/<mount>/login`. The secret ID may be passed as a response-wrapping
//!   token, in which case it is redeemed via `sys/wrapping/unwrap` first.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::VaultClient;
use crate::error::{Error, Result};
use crate::session::Session;

/// Default mount of the AppRole auth backend
pub const DEFAULT_APPROLE_MOUNT: &str = "approle";

/// Auth method selector as given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    /// Pre-supplied token
    Token,
    /// AppRole login
    AppRole,
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthKind::Token => write!(f, "token"),
            AuthKind::AppRole => write!(f, "approle"),
        }
    }
}

impl FromStr for AuthKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "token" => Ok(AuthKind::Token),
            "approle" => Ok(AuthKind::AppRole),
            other => Err(Error::InvalidAuthMethod(other.to_string())),
        }
    }
}

/// AppRole credentials
#[derive(Clone, PartialEq, Eq)]
pub struct AppRoleAuth {
    /// Mount path of the AppRole backend
    pub mount: String,
    /// Role ID
    pub role_id: String,
    /// Secret ID, or a wrapping token for one when `wrapped` is set
    pub secret_id: Option<String>,
    /// Whether `secret_id` is a response-wrapping token
    pub wrapped: bool,
}

impl fmt::Debug for AppRoleAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppRoleAuth")
            .field("mount", &self.mount)
            .field("role_id", &self.role_id)
            .field("secret_id", &self.secret_id.as_ref().map(|_| "<redacted>"))
            .field("wrapped", &self.wrapped)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    role_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct UnwrappedSecretId {
    secret_id: String,
}

impl AppRoleAuth {
    /// Create AppRole credentials; empty secret IDs are treated as absent
    pub fn new(
        mount: impl Into<String>,
        role_id: impl Into<String>,
        secret_id: Option<String>,
        wrapped: bool,
    ) -> Result<Self> {
        let role_id = role_id.into();
        if role_id.is_empty() {
            return Err(Error::MissingRoleId);
        }
        Ok(Self {
            mount: mount.into(),
            role_id,
            secret_id: secret_id.filter(|s| !s.is_empty()),
            wrapped,
        })
    }

    /// Log in and return the issued client token
    pub async fn login(&self, client: &VaultClient) -> Result<String> {
        let secret_id = match &self.secret_id {
            Some(wrapping_token) if self.wrapped => {
                Some(self.unwrap_secret_id(client, wrapping_token).await?)
            }
            Some(secret_id) => Some(secret_id.clone()),
            None => None,
        };

        let body = LoginRequest {
            role_id: &self.role_id,
            secret_id: secret_id.as_deref(),
        };
        let path = format!("auth/{}/login", self.mount.trim_matches('/'));

        let secret = client
            .write(&path, None, &body)
            .await?
            .ok_or(Error::EmptyResponse("AppRole login"))?;

        secret
            .auth
            .map(|auth| auth.client_token)
            .filter(|token| !token.is_empty())
            .ok_or(Error::NoTokenReturned)
    }

    /// Redeem a response-wrapping token for the secret ID it wraps
    async fn unwrap_secret_id(&self, client: &VaultClient, wrapping_token: &str) -> Result<String> {
        tracing::debug!("redeeming wrapped secret ID");
        let secret = client
            .write("sys/wrapping/unwrap", Some(wrapping_token), &serde_json::json!({}))
            .await?
            .ok_or(Error::EmptyResponse("unwrap request"))?;

        let data = secret
            .data
            .ok_or(Error::EmptyResponse("unwrap request"))?;
        let unwrapped: UnwrappedSecretId = serde_json::from_value(Value::Object(data))
            .map_err(|e| Error::Decode(format!("failed parsing the unwrapped secret ID: {}", e)))?;

        Ok(unwrapped.secret_id)
    }
}

/// Auth method resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Use the token already carried by the session
    Token,
    /// Exchange AppRole credentials for a token
    AppRole(AppRoleAuth),
}

impl AuthMethod {
    /// The selector this method was built from
    pub fn kind(&self) -> AuthKind {
        match self {
            AuthMethod::Token => AuthKind::Token,
            AuthMethod::AppRole(_) => AuthKind::AppRole,
        }
    }

    /// Make sure `session` carries a token, logging in if necessary
    ///
    /// A session that already has a token is left untouched, so calling this
    /// before every request only contacts the server once.
    pub async fn ensure_authenticated(
        &self,
        session: &mut Session,
        client: &VaultClient,
    ) -> Result<()> {
        if session.is_authenticated() {
            return Ok(());
        }

        match self {
            AuthMethod::Token => return Err(Error::MissingToken),
            AuthMethod::AppRole(approle) => {
                tracing::info!(mount = %approle.mount, "logging in with AppRole");
                let token = approle.login(client).await?;
                session.set_token(token);
            }
        }

        if !session.is_authenticated() {
            return Err(Error::NoTokenReturned);
        }
        Ok(())
    }
}
