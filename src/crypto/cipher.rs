//! AES-256-GCM encryption of stored site passwords.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  The stored string is:
//!   base64( 12-byte nonce | ciphertext + 16-byte auth tag )

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::errors::{Result, VaultError};

use super::keys::EntryKey;

/// Size of the AES-256-GCM nonce in bytes.
const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
const TAG_LEN: usize = 16;

/// Encrypts and decrypts entry passwords under the service-wide key.
pub struct EntryCipher {
    cipher: Aes256Gcm,
}

impl EntryCipher {
    pub fn new(key: &EntryKey) -> Result<Self> {
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| VaultError::Crypto(format!("invalid key length: {e}")))?;
        Ok(Self { cipher })
    }

    /// Encrypt a site password into its at-rest string form.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let sealed = self.encrypt_bytes(plaintext.as_bytes())?;
        Ok(BASE64.encode(sealed))
    }

    /// Decrypt a string produced by `encrypt`.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let sealed = BASE64
            .decode(ciphertext)
            .map_err(|e| VaultError::Crypto(format!("ciphertext is not valid base64: {e}")))?;
        let plaintext = self.decrypt_bytes(&sealed)?;

        String::from_utf8(plaintext)
            .map_err(|_| VaultError::Crypto("decrypted value is not valid UTF-8".into()))
    }

    /// Encrypt raw bytes. Returns `nonce || ciphertext`.
    pub fn encrypt_bytes(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| VaultError::Crypto(format!("encryption error: {e}")))?;

        let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        output.extend_from_slice(&nonce);
        output.extend_from_slice(&ciphertext);
        Ok(output)
    }

    /// Decrypt data produced by `encrypt_bytes`, verifying the auth tag.
    pub fn decrypt_bytes(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(VaultError::Crypto("ciphertext is truncated".into()));
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher.decrypt(nonce, ciphertext).map_err(|_| {
            VaultError::Crypto("decryption failed: wrong key or corrupted data".into())
        })
    }
}

impl std::fmt::Debug for EntryCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EntryCipher { .. }")
    }
}
