//! Error types for the signing plugin

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a signing run
#[derive(Error, Debug)]
pub enum Error {
    #[error("Vault host was not specified, set the `VAULT_ADDR` environment variable")]
    MissingAddress,

    #[error("configured auth method `approle` requires at least a role ID to be set")]
    MissingRoleId,

    #[error(
        "auth method is `token` and no Vault token was specified, set the `VAULT_TOKEN` \
         environment variable or use AppRole auth"
    )]
    MissingToken,

    #[error("invalid file pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed decoding base64-encoded signature: {0}")]
    SignatureDecode(#[from] base64::DecodeError),

    #[error("failed to sign {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Client(#[from] vault_gpgsign_client::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Attach the file being processed to an error
    pub fn for_file(self, path: impl Into<PathBuf>) -> Self {
        Error::File {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

/// Result type for plugin operations
pub type Result<T> = std::result::Result<T, Error>;
