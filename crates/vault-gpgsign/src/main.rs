//! vault-gpgsign binary
//!
//! Exits with status 0 when every selected file was signed (or none matched)
//! and 1 on any failure.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vault_gpgsign::cli::Args;
use vault_gpgsign::{Plugin, Result};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = args.into_config().with_vault_env();
    let mut plugin = Plugin::new(config)?;
    let written = plugin.exec().await?;
    for path in &written {
        info!(signature = %path.display(), "written");
    }
    Ok(())
}
