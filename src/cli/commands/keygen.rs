//! `passvault keygen` — write a random entry key file.

use std::path::Path;

use crate::cli::output;
use crate::config::Settings;
use crate::crypto::generate_key_file;
use crate::errors::Result;

/// Execute the `keygen` command.
pub fn execute(path: &str) -> Result<()> {
    generate_key_file(Path::new(path))?;

    output::success(&format!("Entry key written to {path}"));
    output::warning("Back this file up: stored passwords cannot be decrypted without it.");
    output::tip(&format!(
        "Point the server at it with `key_file = \"{path}\"` in {}",
        Settings::FILE_NAME
    ));
    Ok(())
}
