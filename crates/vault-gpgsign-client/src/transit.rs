//! Signing requests against the GPG secrets engine

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::AuthMethod;
use crate::client::VaultClient;
use crate::error::{Error, Result};
use crate::session::Session;

/// Value of the `format` field requesting an ASCII-armored signature
pub const ASCII_ARMOR: &str = "ascii-armor";

/// Where and how to sign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitConfig {
    /// Mount path of the GPG secrets engine
    pub mount: String,
    /// Name of the signing key
    pub key: String,
    /// Hash algorithm identifier, e.g. `sha2-256`
    pub algorithm: String,
    /// Request ASCII-armored signatures instead of binary ones
    pub armor: bool,
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            mount: "gpg".to_string(),
            key: "drone".to_string(),
            algorithm: "sha2-256".to_string(),
            armor: false,
        }
    }
}

impl TransitConfig {
    /// Logical path of the sign endpoint, `<mount>/sign/<key>`
    pub fn endpoint(&self) -> String {
        format!("{}/sign/{}", self.mount.trim_matches('/'), self.key)
    }
}

/// Body of a sign request
///
/// `format` is left out of the JSON entirely when binary output is wanted;
/// the engine treats an absent field and an empty string differently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub algorithm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Base64 of the data to sign
    pub input: String,
}

impl SignRequest {
    /// Build a request for `data`
    pub fn new(algorithm: impl Into<String>, data: &[u8], armor: bool) -> Self {
        Self {
            algorithm: algorithm.into(),
            format: armor.then(|| ASCII_ARMOR.to_string()),
            input: STANDARD.encode(data),
        }
    }
}

/// Transparency metadata some engines attach to a signature
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub uuid: String,
}

/// Decoded `data` of a sign response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignResponse {
    /// Base64 of the binary signature, or the armored signature text
    pub signature: String,
    #[serde(default)]
    pub log_entry: Option<LogEntry>,
}

/// Signs data with a named key, authenticating on demand
#[derive(Debug)]
pub struct TransitSigner {
    client: VaultClient,
    auth: AuthMethod,
    session: Session,
    config: TransitConfig,
}

impl TransitSigner {
    /// Create a signer; `session` may already carry a pre-supplied token
    pub fn new(
        client: VaultClient,
        auth: AuthMethod,
        session: Session,
        config: TransitConfig,
    ) -> Self {
        Self {
            client,
            auth,
            session,
            config,
        }
    }

    /// Make sure the session carries a token
    pub async fn ensure_authenticated(&mut self) -> Result<()> {
        self.auth
            .ensure_authenticated(&mut self.session, &self.client)
            .await
    }

    /// Request a signature over `data`
    pub async fn sign(&mut self, data: &[u8]) -> Result<SignResponse> {
        self.ensure_authenticated().await?;

        let endpoint = self.config.endpoint();
        let request = SignRequest::new(&self.config.algorithm, data, self.config.armor);

        let secret = self
            .client
            .write(&endpoint, self.session.token(), &request)
            .await?
            .ok_or(Error::EmptyResponse("signature request"))?;

        let data = secret
            .data
            .ok_or(Error::EmptyResponse("signature request"))?;

        let response: SignResponse = serde_json::from_value(Value::Object(data))
            .map_err(|e| Error::Decode(format!("failed parsing the signature response: {}", e)))?;

        if let Some(entry) = &response.log_entry {
            tracing::debug!(address = %entry.address, uuid = %entry.uuid, "signature log entry");
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn signer(server: &MockServer, armor: bool) -> TransitSigner {
        let client = VaultClient::new(ClientConfig::new(server.uri())).unwrap();
        let config = TransitConfig {
            armor,
            ..TransitConfig::default()
        };
        TransitSigner::new(client, AuthMethod::Token, Session::with_token("s.token"), config)
    }

    #[test]
    fn test_endpoint() {
        let config = TransitConfig {
            mount: "/pki-gpg/".to_string(),
            key: "release".to_string(),
            ..TransitConfig::default()
        };
        assert_eq!(config.endpoint(), "pki-gpg/sign/release");
        assert_eq!(TransitConfig::default().endpoint(), "gpg/sign/drone");
    }

    #[test]
    fn test_binary_request_omits_format() {
        let request = SignRequest::new("sha2-256", b"hello", false);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({"algorithm": "sha2-256", "input": "aGVsbG8="}));
        assert!(value.get("format").is_none());
    }

    #[test]
    fn test_armored_request_sets_format() {
        let request = SignRequest::new("sha2-512", b"hello", true);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"algorithm": "sha2-512", "format": "ascii-armor", "input": "aGVsbG8="})
        );
    }

    #[test]
    fn test_empty_algorithm_is_omitted() {
        let value = serde_json::to_value(SignRequest::new("", b"", false)).unwrap();
        assert_eq!(value, json!({"input": ""}));
    }

    #[tokio::test]
    async fn test_sign() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/gpg/sign/drone"))
            .and(header("X-Vault-Token", "s.token"))
            .and(body_json(json!({"algorithm": "sha2-256", "input": "aGVsbG8="})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "signature": "c2lnbmF0dXJl",
                    "log_entry": {"address": "https://rekor", "uuid": "1234"}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut signer = signer(&server, false);
        let response = signer.sign(b"hello").await.unwrap();
        assert_eq!(response.signature, "c2lnbmF0dXJl");
        assert_eq!(response.log_entry.unwrap().uuid, "1234");
    }

    #[tokio::test]
    async fn test_sign_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let err = signer(&server, false).sign(b"hello").await.unwrap_err();
        assert!(matches!(err, Error::EmptyResponse(_)));
        assert_eq!(err.to_string(), "expected a response for signature request");
    }

    #[tokio::test]
    async fn test_sign_response_without_data() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": null})))
            .mount(&server)
            .await;

        let err = signer(&server, true).sign(b"hello").await.unwrap_err();
        assert!(matches!(err, Error::EmptyResponse(_)));
    }

    #[tokio::test]
    async fn test_sign_malformed_response() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"signature": 42}})),
            )
            .mount(&server)
            .await;

        let err = signer(&server, false).sign(b"hello").await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn test_sign_without_token_never_calls_server() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = VaultClient::new(ClientConfig::new(server.uri())).unwrap();
        let mut signer =
            TransitSigner::new(client, AuthMethod::Token, Session::new(), TransitConfig::default());
        let err = signer.sign(b"hello").await.unwrap_err();
        assert!(matches!(err, Error::MissingToken));
    }
}
