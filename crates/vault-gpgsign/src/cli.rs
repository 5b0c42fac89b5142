//! Command-line flags
//!
//! Every flag falls back to a `PLUGIN_*` environment variable, which is how
//! Drone passes plugin `settings` to the step container.

use clap::builder::BoolishValueParser;
use clap::Parser;

use crate::config::Config;

/// Sign build artifacts with Vault's GPG secrets engine
#[derive(Parser, Debug)]
#[command(name = "vault-gpgsign")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:
    VAULT_ADDR       Address of the Vault server (required)
    VAULT_TOKEN      Vault token (required for --auth token)
    VAULT_NAMESPACE  Vault Enterprise namespace
")]
pub struct Args {
    /// Named Vault GPG key to sign the artifacts with
    #[arg(long, env = "PLUGIN_KEY", default_value = "drone")]
    pub key: String,

    /// Write ASCII-armored detached signatures (.asc) instead of binary ones (.sig)
    #[arg(long, env = "PLUGIN_ARMOR", value_parser = BoolishValueParser::new())]
    pub armor: bool,

    /// Mount the GPG secret backend is mounted at
    #[arg(long, env = "PLUGIN_MOUNT", default_value = "gpg")]
    pub mount: String,

    /// Hash algorithm to use
    #[arg(long, env = "PLUGIN_ALGO", default_value = "sha2-256")]
    pub algo: String,

    /// Auth method to use with Vault (`token` or `approle`)
    #[arg(long, env = "PLUGIN_AUTH", default_value = "token")]
    pub auth: String,

    /// Mount the AppRole auth backend is mounted at
    #[arg(long = "authmount", env = "PLUGIN_AUTHMOUNT", default_value = "approle")]
    pub auth_mount: String,

    /// AppRole role ID to authenticate with
    #[arg(long = "roleid", env = "PLUGIN_ROLEID")]
    pub role_id: Option<String>,

    /// AppRole secret ID to authenticate with
    #[arg(long = "secretid", env = "PLUGIN_SECRETID", hide_env_values = true)]
    pub secret_id: Option<String>,

    /// The secret ID is passed as a response-wrapping token
    #[arg(
        long = "wrapped-secret",
        env = "PLUGIN_WRAPPED_SECRET",
        value_parser = BoolishValueParser::new()
    )]
    pub secret_wrapped: bool,

    /// Files to sign (glob patterns, `**` allowed)
    #[arg(long, env = "PLUGIN_FILES", value_delimiter = ',', required = true, num_args = 1..)]
    pub files: Vec<String>,

    /// Patterns of files to leave unsigned
    #[arg(long, env = "PLUGIN_EXCLUDE", value_delimiter = ',', num_args = 1..)]
    pub exclude: Vec<String>,
}

impl Args {
    /// Convert the parsed flags into a [`Config`] without Vault settings
    pub fn into_config(self) -> Config {
        Config {
            key: self.key,
            armor: self.armor,
            mount: self.mount,
            algo: self.algo,
            auth: self.auth,
            auth_mount: self.auth_mount,
            role_id: self.role_id,
            secret_id: self.secret_id,
            secret_wrapped: self.secret_wrapped,
            files: self.files,
            exclude: self.exclude,
            vault_addr: None,
            vault_token: None,
            vault_namespace: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "vault-gpgsign",
            "--key",
            "release",
            "--armor",
            "--auth",
            "approle",
            "--authmount",
            "ci",
            "--roleid",
            "role",
            "--secretid",
            "s.wrap",
            "--wrapped-secret",
            "--files",
            "dist/*.tar.gz,dist/*.zip",
            "--exclude",
            "dist/*-debug.zip",
        ])
        .unwrap();

        let config = args.into_config();
        assert_eq!(config.key, "release");
        assert!(config.armor);
        assert_eq!(config.auth, "approle");
        assert_eq!(config.auth_mount, "ci");
        assert_eq!(config.role_id.as_deref(), Some("role"));
        assert_eq!(config.secret_id.as_deref(), Some("s.wrap"));
        assert!(config.secret_wrapped);
        assert_eq!(config.files, vec!["dist/*.tar.gz", "dist/*.zip"]);
        assert_eq!(config.exclude, vec!["dist/*-debug.zip"]);
    }

    #[test]
    fn test_files_are_required() {
        // guard against a PLUGIN_FILES leaking in from the environment
        if std::env::var_os("PLUGIN_FILES").is_some() {
            return;
        }
        assert!(Args::try_parse_from(["vault-gpgsign"]).is_err());
    }

    #[test]
    fn test_boolish_env_values() {
        // Drone passes booleans the way Go's strconv.ParseBool spells them
        let cases = [
            ("1", true),
            ("t", true),
            ("T", true),
            ("TRUE", true),
            ("True", true),
            ("true", true),
            ("0", false),
            ("f", false),
            ("FALSE", false),
            ("False", false),
        ];
        for (value, expected) in cases {
            std::env::set_var("PLUGIN_ARMOR", value);
            std::env::set_var("PLUGIN_WRAPPED_SECRET", value);
            let parsed = Args::try_parse_from(["vault-gpgsign", "--files", "a"]);
            std::env::remove_var("PLUGIN_ARMOR");
            std::env::remove_var("PLUGIN_WRAPPED_SECRET");

            let args = parsed.unwrap_or_else(|e| panic!("{value}: {e}"));
            assert_eq!(args.armor, expected, "PLUGIN_ARMOR={value}");
            assert_eq!(args.secret_wrapped, expected, "PLUGIN_WRAPPED_SECRET={value}");
        }
    }
}
