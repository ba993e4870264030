//! Salted account password hashing using Argon2id.
//!
//! Argon2id is memory-hard, which keeps offline guessing against a
//! stolen `users.json` expensive.  Salts and digests are stored as
//! base64 strings so the users file stays human-readable.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::TryRngCore;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::errors::{Result, VaultError};

/// Length of a generated salt in bytes (256 bits).
const SALT_LEN: usize = 32;

/// Length of the stored digest in bytes.
const HASH_LEN: usize = 32;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Configurable Argon2id parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Params {
    /// The cheapest parameters the hasher accepts.
    pub fn minimum() -> Self {
        Self {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Produces and checks account password verifiers.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Build a hasher, rejecting dangerously weak parameters.
    pub fn new(argon2_params: Argon2Params) -> Result<Self> {
        if argon2_params.memory_kib < MIN_MEMORY_KIB {
            return Err(VaultError::Config(format!(
                "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
                argon2_params.memory_kib
            )));
        }
        if argon2_params.iterations < 1 {
            return Err(VaultError::Config(
                "Argon2 iterations must be at least 1".into(),
            ));
        }
        if argon2_params.parallelism < 1 {
            return Err(VaultError::Config(
                "Argon2 parallelism must be at least 1".into(),
            ));
        }

        let params = Params::new(
            argon2_params.memory_kib,
            argon2_params.iterations,
            argon2_params.parallelism,
            Some(HASH_LEN),
        )
        .map_err(|e| VaultError::Config(format!("invalid Argon2 params: {e}")))?;

        Ok(Self { params })
    }

    /// Generate a fresh random salt from the OS CSPRNG, base64 encoded.
    pub fn generate_salt(&self) -> Result<String> {
        let mut salt = [0u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| VaultError::Crypto(format!("OS random source unavailable: {e}")))?;
        Ok(BASE64.encode(salt))
    }

    /// Hash `password` with `salt`. Deterministic in both inputs.
    pub fn hash(&self, password: &str, salt: &str) -> Result<String> {
        let mut digest = self.digest(password, salt)?;
        let encoded = BASE64.encode(digest);
        digest.zeroize();
        Ok(encoded)
    }

    /// Check `candidate` against a stored digest in constant time.
    pub fn verify(&self, candidate: &str, digest: &str, salt: &str) -> Result<bool> {
        let expected = BASE64
            .decode(digest)
            .map_err(|e| VaultError::Crypto(format!("stored digest is not valid base64: {e}")))?;

        let mut actual = self.digest(candidate, salt)?;
        let matches: bool = actual.as_slice().ct_eq(expected.as_slice()).into();
        actual.zeroize();
        Ok(matches)
    }

    fn digest(&self, password: &str, salt: &str) -> Result<[u8; HASH_LEN]> {
        let salt_bytes = BASE64
            .decode(salt)
            .map_err(|e| VaultError::Crypto(format!("salt is not valid base64: {e}")))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        let mut out = [0u8; HASH_LEN];
        argon2
            .hash_password_into(password.as_bytes(), &salt_bytes, &mut out)
            .map_err(|e| VaultError::Crypto(format!("Argon2id hashing failed: {e}")))?;
        Ok(out)
    }
}
