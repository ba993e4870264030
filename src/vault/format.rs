//! On-disk JSON documents and atomic writes.
//!
//! The vault is mirrored into two pretty-printed UTF-8 documents:
//!
//! ```text
//! users.json      { "<username>": ["<password_hash>", "<salt>"], ... }
//! passwords.json  { "<username>": { "<website>": { "website", "username", "password" } } }
//! ```
//!
//! Maps are `BTreeMap`s so repeated saves of the same state produce
//! byte-identical files.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::model::{Account, Entry};
use crate::errors::{Result, VaultError};

/// Contents of `users.json`.
pub type UsersDocument = BTreeMap<String, Account>;

/// Contents of `passwords.json`.
pub type EntriesDocument = BTreeMap<String, BTreeMap<String, Entry>>;

/// Read and parse a JSON document.
///
/// Returns `Ok(None)` if the file does not exist.  Unparseable content
/// is a `Persistence` error.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let data = fs::read(path).map_err(|e| {
        VaultError::Persistence(format!("failed to read {}: {e}", path.display()))
    })?;

    let doc = serde_json::from_slice(&data).map_err(|e| {
        VaultError::Persistence(format!("malformed JSON in {}: {e}", path.display()))
    })?;

    Ok(Some(doc))
}

/// Serialize `doc` and write it to `path` **atomically**.
///
/// 1. Serialize to indented JSON.
/// 2. Write to a temp file in the same directory and fsync it.
/// 3. Rename the temp file over the target path.
///
/// The rename ensures readers never see a half-written file.
pub fn write_document<T: Serialize>(path: &Path, doc: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(doc).map_err(|e| {
        VaultError::Persistence(format!("failed to serialize {}: {e}", path.display()))
    })?;
    bytes.push(b'\n');

    let tmp_path = temp_path_for(path);
    write_synced(&tmp_path, &bytes).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        VaultError::Persistence(format!("failed to write {}: {e}", tmp_path.display()))
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        VaultError::Persistence(format!("failed to replace {}: {e}", path.display()))
    })?;

    Ok(())
}

/// Sibling temp file used while writing `path`: `<dir>/.<name>.tmp`.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    // Owner-only: the users file holds password verifiers.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file: File = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
