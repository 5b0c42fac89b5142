//! HTTP transport for the Vault logical API
//!
//! Only the pieces a signing run needs are implemented: authenticated
//! `PUT /v1/<path>` writes and decoding of Vault's response and error bodies.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::error::{Error, Result};

/// Request timeout used when none is configured (matches the Vault CLI default)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

/// Connection settings for a Vault server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address, e.g. `https://vault.example.com:8200`
    pub address: String,
    /// Enterprise namespace sent with every request
    pub namespace: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration for the given address with default settings
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            namespace: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the namespace; empty values are ignored
    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace.filter(|ns| !ns.is_empty());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Response envelope of a logical request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secret {
    /// Engine-specific payload
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
    /// Present on login responses
    #[serde(default)]
    pub auth: Option<SecretAuth>,
    /// Non-fatal warnings attached by the server
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
}

/// Auth block of a login response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretAuth {
    /// The issued token
    #[serde(default)]
    pub client_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

/// Minimal Vault API client
#[derive(Debug, Clone)]
pub struct VaultClient {
    base_url: Url,
    namespace: Option<String>,
    client: reqwest::Client,
}

impl VaultClient {
    /// Build a client from the given configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        // A trailing slash makes `Url::join` append instead of replacing the last segment
        let address = format!("{}/", config.address.trim_end_matches('/'));
        let base_url = Url::parse(&address)
            .map_err(|e| Error::Url(format!("invalid Vault address `{}`: {}", config.address, e)))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Http(format!("failed instantiating HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            namespace: config.namespace,
            client,
        })
    }

    /// The server base URL
    pub fn address(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a logical path (e.g. `gpg/sign/drone`) to its API URL
    pub fn url_for(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(&format!("v1/{}", path.trim_start_matches('/')))
            .map_err(|e| Error::Url(format!("invalid request path `{}`: {}", path, e)))
    }

    /// Write `body` to a logical path
    ///
    /// Returns `Ok(None)` when the server answers without a body (e.g. `204 No
    /// Content`), mirroring how Vault reports writes that produce no secret.
    pub async fn write<B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<Option<Secret>> {
        let url = self.url_for(path)?;
        tracing::debug!(%url, "vault write");

        let mut request = self.client.put(url).json(body);
        if let Some(token) = token {
            request = request.header(TOKEN_HEADER, token);
        }
        if let Some(namespace) = &self.namespace {
            request = request.header(NAMESPACE_HEADER, namespace);
        }

        let response = request.send().await.map_err(|e| Error::Http(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Http(format!("failed reading response body: {}", e)))?;

        if !status.is_success() {
            let errors = serde_json::from_slice::<ErrorResponse>(&bytes)
                .map(|r| r.errors)
                .unwrap_or_else(|_| vec![String::from_utf8_lossy(&bytes).trim().to_string()]);
            return Err(Error::Api {
                status: status.as_u16(),
                errors,
            });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let secret: Secret = serde_json::from_slice(&bytes)
            .map_err(|e| Error::Decode(format!("failed parsing response from {}: {}", path, e)))?;

        if let Some(warnings) = &secret.warnings {
            for warning in warnings {
                tracing::warn!(path, "{}", warning);
            }
        }

        Ok(Some(secret))
    }
}
