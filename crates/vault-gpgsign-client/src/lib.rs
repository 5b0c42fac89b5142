//! Vault client for detached GPG signing
//!
//! This crate talks to a Vault server running a GPG secrets engine. It covers
//! the two pieces a signing run needs:
//!
//! - **Authentication**: either a pre-supplied token or an AppRole login,
//!   optionally redeeming a response-wrapped secret ID first.
//! - **Signing**: `<mount>/sign/<key>` requests returning binary (base64 over
//!   the wire) or ASCII-armored signatures.
//!
//! # Example
//!
//! ```no_run
//! use vault_gpgsign_client::{AuthMethod, ClientConfig, Session, TransitConfig, TransitSigner, VaultClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = VaultClient::new(ClientConfig::new("https://vault.example.com:8200"))?;
//! let session = Session::with_token("s.xxxxxxxx");
//! let mut signer = TransitSigner::new(client, AuthMethod::Token, session, TransitConfig::default());
//!
//! let response = signer.sign(b"hello world").await?;
//! println!("{}", response.signature);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod session;
pub mod transit;

pub use auth::{AppRoleAuth, AuthKind, AuthMethod, DEFAULT_APPROLE_MOUNT};
pub use client::{ClientConfig, Secret, SecretAuth, VaultClient, DEFAULT_TIMEOUT};
pub use error::{Error, Result};
pub use session::Session;
pub use transit::{LogEntry, SignRequest, SignResponse, TransitConfig, TransitSigner, ASCII_ARMOR};
