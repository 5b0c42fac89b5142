//! Persisting detached signatures next to the signed file

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::Result;

/// On-disk encoding of a signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureFormat {
    /// Raw OpenPGP packets, `.sig`
    Binary,
    /// ASCII-armored text, `.asc`
    Armored,
}

impl SignatureFormat {
    /// Format for the given armor setting
    pub fn from_armor(armor: bool) -> Self {
        if armor {
            SignatureFormat::Armored
        } else {
            SignatureFormat::Binary
        }
    }

    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            SignatureFormat::Binary => "sig",
            SignatureFormat::Armored => "asc",
        }
    }

    /// Bytes to write for a signature as returned by Vault
    ///
    /// Binary signatures travel base64-encoded and are decoded here; armored
    /// ones are already text and are kept byte-for-byte.
    pub fn encode(&self, signature: &str) -> Result<Vec<u8>> {
        match self {
            SignatureFormat::Binary => Ok(STANDARD.decode(signature.trim())?),
            SignatureFormat::Armored => Ok(signature.as_bytes().to_vec()),
        }
    }
}

/// `<path>.sig` or `<path>.asc`
pub fn signature_path(path: &Path, format: SignatureFormat) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

/// Write the signature for `path`, replacing any previous one
///
/// Returns the path of the signature file.
pub fn write_signature(path: &Path, signature: &str, armor: bool) -> Result<PathBuf> {
    let format = SignatureFormat::from_armor(armor);
    let bytes = format.encode(signature)?;
    let target = signature_path(path, format);

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    let mut file = options.open(&target)?;
    file.write_all(&bytes)?;
    file.flush()?;

    tracing::debug!(path = %target.display(), bytes = bytes.len(), "wrote signature");
    Ok(target)
}
