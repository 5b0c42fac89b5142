//! Signing run orchestration

use std::path::{Path, PathBuf};

use vault_gpgsign_client::{Session, TransitSigner, VaultClient};

use crate::config::Config;
use crate::error::Result;
use crate::files::find_files;
use crate::writer::write_signature;

/// A configured signing run
///
/// Construction validates the configuration without any network activity;
/// [`Plugin::exec`] then signs every selected file in order and stops at the
/// first failure.
#[derive(Debug)]
pub struct Plugin {
    config: Config,
    signer: TransitSigner,
}

impl Plugin {
    /// Validate `config` and prepare the Vault client
    pub fn new(config: Config) -> Result<Self> {
        let auth = config.validate()?;
        tracing::debug!(
            auth = %auth.kind(),
            endpoint = %config.transit_config().endpoint(),
            "configuration validated"
        );
        let client = VaultClient::new(config.client_config())?;
        let session = Session::from_optional(config.vault_token.clone());
        let signer = TransitSigner::new(client, auth, session, config.transit_config());

        Ok(Self { config, signer })
    }

    /// Sign all selected files, returning the written signature paths
    pub async fn exec(&mut self) -> Result<Vec<PathBuf>> {
        let files = find_files(&self.config.files, &self.config.exclude)?;
        if files.is_empty() {
            tracing::info!("no files to sign");
            return Ok(Vec::new());
        }

        tracing::info!(
            count = files.len(),
            key = %self.config.key,
            armor = self.config.armor,
            "signing files"
        );

        let mut written = Vec::with_capacity(files.len());
        for file in &files {
            tracing::info!(file = %file.display(), "signing file");
            let signature = self
                .sign_file(file)
                .await
                .map_err(|e| e.for_file(file))?;
            written.push(signature);
        }

        tracing::info!(count = written.len(), "signed all files");
        Ok(written)
    }

    async fn sign_file(&mut self, file: &Path) -> Result<PathBuf> {
        let data = std::fs::read(file)?;
        let response = self.signer.sign(&data).await?;
        write_signature(file, &response.signature, self.config.armor)
    }
}
