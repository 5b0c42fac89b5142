//! Error types for Vault requests

use thiserror::Error;

/// Errors that can occur while authenticating to or signing with Vault
#[derive(Error, Debug)]
pub enum Error {
    /// Token auth was selected but the session carries no token
    #[error("token authentication is requested, but no token was found")]
    MissingToken,

    /// The auth method selector names no known method
    #[error("invalid auth method `{0}` configured")]
    InvalidAuthMethod(String),

    /// AppRole auth was selected without a role ID
    #[error("auth method `approle` requires a role ID")]
    MissingRoleId,

    /// Authentication reported success without yielding a token
    #[error("authentication did not provide a token, this is most likely an internal error")]
    NoTokenReturned,

    /// The server answered a write with no body
    #[error("expected a response for {0}")]
    EmptyResponse(&'static str),

    /// The server rejected the request
    #[error("Vault returned {status}: {}", .errors.join("; "))]
    Api { status: u16, errors: Vec<String> },

    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// A response did not have the expected shape
    #[error("decode error: {0}")]
    Decode(String),

    /// The Vault address or a request path is not a valid URL
    #[error("invalid URL: {0}")]
    Url(String),
}

/// Result type for Vault operations
pub type Result<T> = std::result::Result<T, Error>;
