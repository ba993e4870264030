//! Service-wide entry key handling.
//!
//! The entry key protects every stored site password.  It is derived
//! with HKDF-SHA256 from operator-supplied key material, which may come
//! from the `PASSVAULT_KEY` environment variable, a key file written by
//! `passvault keygen`, or (development only) a built-in constant.

use std::fs;
use std::path::Path;

use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::TryRngCore;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::errors::{Result, VaultError};

/// Length of the AES-256 entry key.
pub const KEY_LEN: usize = 32;

/// Length of a freshly generated key file.
const KEY_FILE_LEN: usize = 32;

/// Minimum accepted length for externally supplied key material.
const MIN_MATERIAL_LEN: usize = 16;

/// HKDF context string binding the derived key to its purpose.
const ENTRY_KEY_INFO: &[u8] = b"passvault-entry-key";

/// Development-only key material. Never use outside `dev_mode`.
pub const DEV_KEY_MATERIAL: &[u8] = b"ThisIsASecretKey";

/// A 32-byte entry key that is wiped from memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct EntryKey {
    bytes: [u8; KEY_LEN],
}

impl EntryKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Stretch arbitrary key material into an entry key.
    ///
    /// The same material always produces the same key, so a restarted
    /// server can decrypt what an earlier run stored.
    pub fn from_material(material: &[u8]) -> Result<Self> {
        if material.len() < MIN_MATERIAL_LEN {
            return Err(VaultError::Config(format!(
                "entry key material must be at least {MIN_MATERIAL_LEN} bytes (got {})",
                material.len()
            )));
        }

        let hk = Hkdf::<Sha256>::new(None, material);
        let mut okm = [0u8; KEY_LEN];
        hk.expand(ENTRY_KEY_INFO, &mut okm)
            .map_err(|e| VaultError::Crypto(format!("HKDF expand failed: {e}")))?;

        let key = Self::new(okm);
        okm.zeroize();
        Ok(key)
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for EntryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EntryKey([REDACTED])")
    }
}

/// Generate a new random key file at `path`.
///
/// Refuses to overwrite an existing file: losing the old key makes
/// every stored entry unreadable.
pub fn generate_key_file(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(VaultError::Config(format!(
            "key file already exists at {}",
            path.display()
        )));
    }

    let mut material = [0u8; KEY_FILE_LEN];
    OsRng
        .try_fill_bytes(&mut material)
        .map_err(|e| VaultError::Crypto(format!("OS random source unavailable: {e}")))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let written = fs::write(path, material);
    material.zeroize();
    written?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

/// Load key material from a key file.
pub fn load_key_file(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(VaultError::Config(format!(
            "key file not found at {}",
            path.display()
        )));
    }

    let data = fs::read(path)?;
    if data.len() < MIN_MATERIAL_LEN {
        return Err(VaultError::Config(format!(
            "key file {} is too short ({} bytes, need at least {MIN_MATERIAL_LEN})",
            path.display(),
            data.len()
        )));
    }
    Ok(data)
}
