//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};

use clap::Parser;
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};
use crate::rpc::{VaultClient, DEFAULT_SERVICE_NAME};

/// Environment variable for scripted account password entry.
const PASSWORD_ENV_VAR: &str = "PASSVAULT_PASSWORD";

/// Default endpoint host for client commands.
const DEFAULT_HOST: &str = "localhost";

/// Default endpoint port for client commands.
const DEFAULT_PORT: u16 = 1099;

/// PassVault CLI: client/server password vault.
#[derive(Parser)]
#[command(name = "passvault", about = "Client/server password vault", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Server host (default: localhost)
    #[arg(long, env = "PASSVAULT_HOST", global = true)]
    pub host: Option<String>,

    /// Server port (default: 1099)
    #[arg(long, env = "PASSVAULT_PORT", global = true)]
    pub port: Option<u16>,

    /// Service name the endpoint is bound under
    #[arg(long, env = "PASSVAULT_SERVICE", global = true)]
    pub service: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the vault server
    Serve {
        /// Directory containing passvault.toml
        #[arg(long, default_value = ".")]
        config_dir: String,

        /// Directory holding users.json and passwords.json
        #[arg(long)]
        data_dir: Option<String>,

        /// Development mode: built-in entry key and demo accounts
        #[arg(long)]
        dev: bool,
    },

    /// Generate a random entry key file for the server
    Keygen {
        /// Where to write the key file
        path: String,
    },

    /// Register a new account
    Register {
        /// Account username
        username: String,
    },

    /// Check account credentials
    Login {
        /// Account username
        username: String,
    },

    /// Store a site password
    Add {
        /// Account username
        username: String,
        /// Website the credential belongs to
        website: String,
        /// Login name on that website
        site_username: String,
    },

    /// Change a stored site password
    Update {
        /// Account username
        username: String,
        /// Website of the existing entry
        website: String,
        /// Login name on that website
        site_username: String,
    },

    /// Delete a stored site password
    Delete {
        /// Account username
        username: String,
        /// Website of the entry to delete
        website: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List stored site passwords
    List {
        /// Account username
        username: String,
        /// Show passwords instead of masking them
        #[arg(long)]
        show: bool,

        /// Only show entries whose website or site username contains TEXT
        #[arg(short, long, value_name = "TEXT")]
        search: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// `host:port` of the endpoint client commands talk to.
pub fn endpoint_address(cli: &Cli) -> String {
    let host = cli.host.as_deref().unwrap_or(DEFAULT_HOST);
    let port = cli.port.unwrap_or(DEFAULT_PORT);
    format!("{host}:{port}")
}

/// Connect the client stub to the configured endpoint.
pub async fn connect(cli: &Cli) -> Result<VaultClient> {
    let service = cli.service.as_deref().unwrap_or(DEFAULT_SERVICE_NAME);
    VaultClient::connect(endpoint_address(cli), service).await
}

/// Get an account password, trying in order:
/// 1. `PASSVAULT_PASSWORD` env var (scripts)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_account_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Account password")
        .interact()
        .map_err(|e| VaultError::Validation(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new account password with confirmation.
///
/// Also respects `PASSVAULT_PASSWORD`.  The server enforces the
/// password policy; this only makes sure the user typed it twice.
pub fn prompt_new_account_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Choose account password")
        .with_confirmation("Confirm account password", "Passwords do not match, try again")
        .interact()
        .map_err(|e| VaultError::Validation(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Read a site password from piped stdin or an interactive prompt.
pub fn read_site_password(website: &str) -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = Zeroizing::new(buf.trim_end().to_string());
        return Ok(trimmed);
    }

    let pw = dialoguer::Password::new()
        .with_prompt(format!("Password for {website}"))
        .interact()
        .map_err(|e| VaultError::Validation(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV_VAR)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_defaults_to_localhost_1099() {
        let cli = Cli::parse_from(["passvault", "list", "alice"]);
        assert_eq!(endpoint_address(&cli), "localhost:1099");
    }

    #[test]
    fn endpoint_uses_global_flags() {
        let cli = Cli::parse_from(["passvault", "login", "alice", "--host", "10.0.0.2", "--port", "4040"]);
        assert_eq!(endpoint_address(&cli), "10.0.0.2:4040");
    }

    #[test]
    fn list_search_flag_parses() {
        let cli = Cli::parse_from(["passvault", "list", "alice", "--search", "Mail"]);
        match cli.command {
            Commands::List { username, search, show } => {
                assert_eq!(username, "alice");
                assert_eq!(search.as_deref(), Some("Mail"));
                assert!(!show);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::parse_from(["passvault", "serve", "--data-dir", "/tmp/v", "--dev"]);
        match cli.command {
            Commands::Serve { data_dir, dev, .. } => {
                assert_eq!(data_dir.as_deref(), Some("/tmp/v"));
                assert!(dev);
            }
            _ => panic!("expected serve"),
        }
    }
}
