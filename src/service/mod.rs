//! The vault service: the operations exposed over RPC.
//!
//! `VaultService` composes the password hasher, the entry cipher and
//! the store.  The store sits behind a single `RwLock`: every mutation,
//! including its disk write, runs under the write lock, so concurrent
//! calls form a serializable history.  Reads take the shared lock and
//! never touch the disk.
//!
//! The expensive work (Argon2id, AES-GCM) happens outside the lock.

pub mod seed;
pub mod validation;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::Settings;
use crate::crypto::{EntryCipher, EntryKey, PasswordHasher};
use crate::errors::{Result, VaultError};
use crate::vault::{Account, Entry, VaultStore};

use validation::{validate_entry, validate_password, validate_username};

/// Salt used to burn the same hashing time for unknown usernames.
const DUMMY_SALT: &str = "cGFzc3ZhdWx0LXVua25vd24tYWNjb3VudC1zYWx0IQ==";

pub struct VaultService {
    store: RwLock<VaultStore>,
    hasher: PasswordHasher,
    cipher: EntryCipher,
}

impl VaultService {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Build a service from already constructed parts.
    pub fn new(store: VaultStore, hasher: PasswordHasher, cipher: EntryCipher) -> Self {
        Self {
            store: RwLock::new(store),
            hasher,
            cipher,
        }
    }

    /// Open the service described by `settings`, resolving the entry key
    /// from the environment / key file.
    pub fn open(settings: &Settings) -> Result<Self> {
        let key = settings.entry_key()?;
        Self::open_with_key(settings, &key)
    }

    /// Open the service with an explicit entry key.
    ///
    /// Loads both documents from `settings.data_dir`.  In `dev_mode`, an
    /// empty vault is seeded with the demo accounts.
    pub fn open_with_key(settings: &Settings, key: &EntryKey) -> Result<Self> {
        let store = VaultStore::load(&settings.users_path(), &settings.passwords_path())?;
        let hasher = PasswordHasher::new(settings.argon2_params())?;
        let cipher = EntryCipher::new(key)?;

        let service = Self::new(store, hasher, cipher);
        let empty = service.read_store().is_empty();
        if settings.dev_mode && empty {
            service.seed_demo_data()?;
        }
        Ok(service)
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    /// Register a new account.
    ///
    /// Returns `Ok(false)` without mutating anything if the username is
    /// taken.  Usernames and passwords that break the policy are a
    /// `Validation` error.
    pub fn register(&self, username: &str, password: &str) -> Result<bool> {
        validate_username(username)?;
        validate_password(password)?;

        if self.read_store().contains_account(username) {
            tracing::info!(%username, "Registration refused, user already exists");
            return Ok(false);
        }

        let salt = self.hasher.generate_salt()?;
        let password_hash = self.hasher.hash(password, &salt)?;
        let account = Account {
            password_hash,
            salt,
        };

        // A concurrent register may have won the race while we hashed.
        match self.write_store().put_account(username, account) {
            Ok(()) => {
                tracing::info!(%username, "User registered");
                Ok(true)
            }
            Err(VaultError::Conflict(_)) => {
                tracing::info!(%username, "Registration refused, user already exists");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Check credentials.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to
    /// the caller: both return `Ok(false)` after the same hashing work.
    pub fn login(&self, username: &str, password: &str) -> Result<bool> {
        let account = self.read_store().get_account(username).cloned();

        let verified = match account {
            Some(account) => {
                self.hasher
                    .verify(password, &account.password_hash, &account.salt)?
            }
            None => {
                self.hasher.hash(password, DUMMY_SALT)?;
                false
            }
        };

        if verified {
            tracing::info!(%username, "Login successful");
        } else {
            tracing::warn!(%username, "Login failed, invalid credentials");
        }
        Ok(verified)
    }

    // ------------------------------------------------------------------
    // Entries
    // ------------------------------------------------------------------

    /// Store `entry` for `username`, replacing any entry for the same
    /// website.
    pub fn add_password(&self, username: &str, entry: &Entry) -> Result<()> {
        validate_entry(entry)?;
        let sealed = self.seal(entry)?;

        let replaced = self.write_store().put_entry(username, sealed)?;
        tracing::info!(
            %username,
            website = %entry.website,
            replaced = replaced.is_some(),
            "Password added"
        );
        Ok(())
    }

    /// Replace the existing entry for `entry.website`.
    pub fn update_password(&self, username: &str, entry: &Entry) -> Result<()> {
        validate_entry(entry)?;
        let sealed = self.seal(entry)?;

        let mut store = self.write_store();
        if store.get_entry(username, &entry.website).is_none() {
            return Err(VaultError::NotFound(format!(
                "entry '{}' for account '{username}'",
                entry.website
            )));
        }
        store.put_entry(username, sealed)?;
        drop(store);

        tracing::info!(%username, website = %entry.website, "Password updated");
        Ok(())
    }

    /// Delete the entry for `website`.
    pub fn delete_password(&self, username: &str, website: &str) -> Result<()> {
        self.write_store().remove_entry(username, website)?;
        tracing::info!(%username, %website, "Password deleted");
        Ok(())
    }

    /// Every entry of `username` with its password decrypted.
    ///
    /// Unknown users simply have no entries.
    pub fn list_passwords(&self, username: &str) -> Result<Vec<Entry>> {
        let stored = self.read_store().list_entries(username);

        let entries = stored
            .into_iter()
            .map(|entry| {
                let password = self.cipher.decrypt(&entry.password).map_err(|e| {
                    tracing::error!(%username, website = %entry.website, "Stored entry cannot be decrypted");
                    e
                })?;
                Ok(Entry { password, ..entry })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(%username, count = entries.len(), "Passwords listed");
        Ok(entries)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Copy of `entry` with its password encrypted for storage.
    fn seal(&self, entry: &Entry) -> Result<Entry> {
        Ok(Entry {
            website: entry.website.clone(),
            username: entry.username.clone(),
            password: self.cipher.encrypt(&entry.password)?,
        })
    }

    // A panic while holding the lock cannot leave the store half-mutated
    // (mutations roll back on error), so poisoned locks are recovered.
    fn read_store(&self) -> RwLockReadGuard<'_, VaultStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, VaultStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for VaultService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultService").finish_non_exhaustive()
    }
}
