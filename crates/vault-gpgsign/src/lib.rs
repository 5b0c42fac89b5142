//! Drone CI plugin that signs build artifacts with Vault's GPG engine
//!
//! For every file selected by the include/exclude patterns the plugin asks
//! Vault for a detached signature and writes it next to the file, as
//! `<file>.sig` (binary) or `<file>.asc` (ASCII-armored).

pub mod cli;
pub mod config;
pub mod error;
pub mod files;
pub mod plugin;
pub mod writer;

pub use config::Config;
pub use error::{Error, Result};
pub use files::find_files;
pub use plugin::Plugin;
pub use writer::{signature_path, write_signature, SignatureFormat};
