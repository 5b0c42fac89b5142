//! Plugin configuration
//!
//! A [`Config`] is built once at startup from flags and the environment and
//! never changes afterwards. [`Config::validate`] runs every precondition
//! check that can fail without touching the network.

use std::fmt;

use vault_gpgsign_client::{
    AppRoleAuth, AuthKind, AuthMethod, ClientConfig, TransitConfig, DEFAULT_APPROLE_MOUNT,
};

use crate::error::{Error, Result};

/// Environment variable holding the Vault address
pub const VAULT_ADDR_ENV: &str = "VAULT_ADDR";
/// Environment variable holding a pre-supplied Vault token
pub const VAULT_TOKEN_ENV: &str = "VAULT_TOKEN";
/// Environment variable holding the Vault Enterprise namespace
pub const VAULT_NAMESPACE_ENV: &str = "VAULT_NAMESPACE";

/// Everything a signing run needs to know
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Named GPG key to sign with
    pub key: String,
    /// Write ASCII-armored `.asc` signatures instead of binary `.sig` ones
    pub armor: bool,
    /// Mount of the GPG secrets engine
    pub mount: String,
    /// Hash algorithm identifier
    pub algo: String,
    /// Auth method selector (`token` or `approle`)
    pub auth: String,
    /// Mount of the AppRole auth backend
    pub auth_mount: String,
    /// AppRole role ID
    pub role_id: Option<String>,
    /// AppRole secret ID, or a wrapping token for one
    pub secret_id: Option<String>,
    /// `secret_id` is a response-wrapping token
    pub secret_wrapped: bool,
    /// Include patterns
    pub files: Vec<String>,
    /// Exclude patterns
    pub exclude: Vec<String>,
    /// Vault server address
    pub vault_addr: Option<String>,
    /// Pre-supplied Vault token
    pub vault_token: Option<String>,
    /// Vault Enterprise namespace
    pub vault_namespace: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let transit = TransitConfig::default();
        Self {
            key: transit.key,
            armor: transit.armor,
            mount: transit.mount,
            algo: transit.algorithm,
            auth: AuthKind::Token.to_string(),
            auth_mount: DEFAULT_APPROLE_MOUNT.to_string(),
            role_id: None,
            secret_id: None,
            secret_wrapped: false,
            files: Vec::new(),
            exclude: Vec::new(),
            vault_addr: None,
            vault_token: None,
            vault_namespace: None,
        }
    }
}

impl Config {
    /// Fill in the Vault connection settings from the process environment
    pub fn with_vault_env(mut self) -> Self {
        self.vault_addr = non_empty_env(VAULT_ADDR_ENV);
        self.vault_token = non_empty_env(VAULT_TOKEN_ENV);
        self.vault_namespace = non_empty_env(VAULT_NAMESPACE_ENV);
        self
    }

    /// Check every precondition and resolve the auth method
    pub fn validate(&self) -> Result<AuthMethod> {
        if is_blank(&self.vault_addr) {
            return Err(Error::MissingAddress);
        }

        match self.auth.parse::<AuthKind>()? {
            AuthKind::AppRole => {
                let role_id = self.role_id.clone().unwrap_or_default();
                if role_id.is_empty() {
                    return Err(Error::MissingRoleId);
                }
                let approle = AppRoleAuth::new(
                    self.auth_mount.clone(),
                    role_id,
                    self.secret_id.clone(),
                    self.secret_wrapped,
                )?;
                Ok(AuthMethod::AppRole(approle))
            }
            AuthKind::Token => {
                if is_blank(&self.vault_token) {
                    return Err(Error::MissingToken);
                }
                Ok(AuthMethod::Token)
            }
        }
    }

    /// Connection settings for the Vault client
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.vault_addr.clone().unwrap_or_default())
            .with_namespace(self.vault_namespace.clone())
    }

    /// Signing settings for the transit signer
    pub fn transit_config(&self) -> TransitConfig {
        TransitConfig {
            mount: self.mount.clone(),
            key: self.key.clone(),
            algorithm: self.algo.clone(),
            armor: self.armor,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("Config")
            .field("key", &self.key)
            .field("armor", &self.armor)
            .field("mount", &self.mount)
            .field("algo", &self.algo)
            .field("auth", &self.auth)
            .field("auth_mount", &self.auth_mount)
            .field("role_id", &self.role_id)
            .field("secret_id", &redacted(&self.secret_id))
            .field("secret_wrapped", &self.secret_wrapped)
            .field("files", &self.files)
            .field("exclude", &self.exclude)
            .field("vault_addr", &self.vault_addr)
            .field("vault_token", &redacted(&self.vault_token))
            .field("vault_namespace", &self.vault_namespace)
            .finish()
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            vault_addr: Some("http://127.0.0.1:8200".to_string()),
            vault_token: Some("s.token".to_string()),
            files: vec!["dist/*".to_string()],
            ..Config::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.key, "drone");
        assert_eq!(config.mount, "gpg");
        assert_eq!(config.algo, "sha2-256");
        assert_eq!(config.auth, "token");
        assert_eq!(config.auth_mount, "approle");
        assert!(!config.armor);
        assert!(!config.secret_wrapped);
    }

    #[test]
    fn test_token_auth() {
        assert_eq!(base().validate().unwrap(), AuthMethod::Token);
    }

    #[test]
    fn test_missing_address() {
        let config = Config {
            vault_addr: Some(String::new()),
            ..base()
        };
        assert!(matches!(config.validate(), Err(Error::MissingAddress)));
    }

    #[test]
    fn test_token_auth_requires_token() {
        let config = Config {
            vault_token: None,
            ..base()
        };
        assert!(matches!(config.validate(), Err(Error::MissingToken)));
    }

    #[test]
    fn test_approle_requires_role_id() {
        let config = Config {
            auth: "approle".to_string(),
            role_id: Some(String::new()),
            vault_token: None,
            ..base()
        };
        assert!(matches!(config.validate(), Err(Error::MissingRoleId)));
    }

    #[test]
    fn test_approle_auth() {
        let config = Config {
            auth: "approle".to_string(),
            auth_mount: "ci".to_string(),
            role_id: Some("role".to_string()),
            secret_id: Some("wrap".to_string()),
            secret_wrapped: true,
            vault_token: None,
            ..base()
        };
        match config.validate().unwrap() {
            AuthMethod::AppRole(approle) => {
                assert_eq!(approle.mount, "ci");
                assert_eq!(approle.role_id, "role");
                assert_eq!(approle.secret_id.as_deref(), Some("wrap"));
                assert!(approle.wrapped);
            }
            other => panic!("unexpected auth method: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_auth_method() {
        let config = Config {
            auth: "userpass".to_string(),
            ..base()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Client(vault_gpgsign_client::Error::InvalidAuthMethod(_))
        ));
        assert!(err.to_string().contains("userpass"));
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = Config {
            secret_id: Some("hunter2".to_string()),
            ..base()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("s.token"));
    }

    #[test]
    fn test_transit_config() {
        let config = Config {
            armor: true,
            key: "release".to_string(),
            ..base()
        };
        let transit = config.transit_config();
        assert!(transit.armor);
        assert_eq!(transit.endpoint(), "gpg/sign/release");
    }
}
