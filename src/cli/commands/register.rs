//! `passvault register` — create a new account on the server.

use crate::cli::output;
use crate::cli::{connect, prompt_new_account_password, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `register` command.
pub async fn execute(cli: &Cli, username: &str) -> Result<()> {
    let password = prompt_new_account_password()?;

    let client = connect(cli).await?;
    if !client.register(username, &password).await? {
        return Err(VaultError::Conflict(format!(
            "username '{username}' is already taken"
        )));
    }

    output::success(&format!("Registered '{username}'"));
    output::tip(&format!(
        "Store your first password: passvault add {username} <WEBSITE> <SITE_USERNAME>"
    ));
    Ok(())
}
