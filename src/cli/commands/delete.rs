//! `passvault delete` — remove a stored site password.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{connect, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `delete` command.
pub async fn execute(cli: &Cli, username: &str, website: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete the password for '{website}'?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::Validation(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let client = connect(cli).await?;
    client.delete_password(username, website).await?;

    output::success(&format!("Deleted password for '{website}'"));
    Ok(())
}
