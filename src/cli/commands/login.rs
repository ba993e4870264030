//! `passvault login` — check account credentials against the server.

use crate::cli::output;
use crate::cli::{connect, prompt_account_password, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `login` command.
pub async fn execute(cli: &Cli, username: &str) -> Result<()> {
    let password = prompt_account_password()?;

    let client = connect(cli).await?;
    if !client.login(username, &password).await? {
        return Err(VaultError::Auth("invalid username or password".into()));
    }

    output::success(&format!("Logged in as '{username}'"));
    Ok(())
}
