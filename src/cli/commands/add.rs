//! `passvault add` — store a site password.

use crate::cli::output;
use crate::cli::{connect, read_site_password, Cli};
use crate::errors::Result;
use crate::vault::Entry;

/// Execute the `add` command.
pub async fn execute(cli: &Cli, username: &str, website: &str, site_username: &str) -> Result<()> {
    let password = read_site_password(website)?;
    let entry = Entry::new(website, site_username, password.as_str());

    let client = connect(cli).await?;
    client.add_password(username, &entry).await?;

    output::success(&format!("Password for '{website}' saved"));
    Ok(())
}
