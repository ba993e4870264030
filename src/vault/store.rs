//! Authoritative in-memory vault state with a mirror on disk.
//!
//! `VaultStore` owns the users table and the per-user entry tables.
//! Every mutating method persists both documents before it returns,
//! and rolls the in-memory change back if the write fails.  When the
//! failed save had already replaced `users.json`, the rolled-back state
//! is written again so that a refused registration does not reappear
//! after a restart.
//!
//! The store itself is not synchronized; `VaultService` wraps it in a
//! `RwLock` so that mutations (including the file writes) are
//! serialized while reads run in parallel.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::format::{self, EntriesDocument, UsersDocument};
use super::model::{Account, Entry};
use crate::errors::{Result, VaultError};

pub struct VaultStore {
    /// Path to `users.json`.
    users_path: PathBuf,

    /// Path to `passwords.json`.
    entries_path: PathBuf,

    /// Account username -> credentials.
    users: UsersDocument,

    /// Account username -> website -> entry (password is ciphertext).
    entries: EntriesDocument,
}

impl VaultStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// An empty store that will persist to the given paths.
    pub fn empty(users_path: &Path, entries_path: &Path) -> Self {
        Self {
            users_path: users_path.to_path_buf(),
            entries_path: entries_path.to_path_buf(),
            users: BTreeMap::new(),
            entries: BTreeMap::new(),
        }
    }

    /// Load the store from its two documents.
    ///
    /// - Both files present: parse them and repair cross-file drift.
    /// - One or both missing: start empty.
    /// - Malformed content: `Persistence` error.
    pub fn load(users_path: &Path, entries_path: &Path) -> Result<Self> {
        let mut store = Self::empty(users_path, entries_path);

        let users: Option<UsersDocument> = format::read_document(users_path)?;
        let entries: Option<EntriesDocument> = format::read_document(entries_path)?;

        match (users, entries) {
            (Some(users), Some(entries)) => {
                store.users = users;
                store.entries = entries;
                store.repair();
                tracing::info!(
                    accounts = store.account_count(),
                    entries = store.entry_count(),
                    "Vault loaded from disk"
                );
            }
            (None, None) => {
                tracing::info!("No vault files found, starting empty");
            }
            (users, _) => {
                let present = if users.is_some() {
                    users_path
                } else {
                    entries_path
                };
                tracing::warn!(
                    file = %present.display(),
                    "Only one vault file exists, ignoring it and starting empty"
                );
            }
        }

        Ok(store)
    }

    /// Reconcile the two tables after a crash between the two writes.
    ///
    /// Accounts without an entry table get an empty one; entry tables
    /// whose account is unknown are dropped.
    fn repair(&mut self) {
        for username in self.users.keys() {
            if !self.entries.contains_key(username) {
                tracing::info!(%username, "Account has no entry table, creating an empty one");
                self.entries.insert(username.clone(), BTreeMap::new());
            }
        }

        let users = &self.users;
        self.entries.retain(|username, table| {
            let known = users.contains_key(username);
            if !known {
                tracing::warn!(
                    %username,
                    dropped = table.len(),
                    "Ignoring entries for unknown account"
                );
            }
            known
        });

        // Entries are keyed by website; heal records whose inner field
        // disagrees with their key.
        for table in self.entries.values_mut() {
            for (website, entry) in table.iter_mut() {
                if entry.website != *website {
                    entry.website = website.clone();
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write both documents, users first.
    ///
    /// Each document is written via temp file + rename.  There is no
    /// cross-file transaction; `load` repairs the orphan-account case.
    pub fn save(&self) -> Result<()> {
        format::write_document(&self.users_path, &self.users)?;
        format::write_document(&self.entries_path, &self.entries)?;
        tracing::debug!(
            accounts = self.account_count(),
            entries = self.entry_count(),
            "Vault saved"
        );
        Ok(())
    }

    /// Best-effort rewrite of both documents after a rollback.
    fn resync_disk(&self) {
        if let Err(e) = self.save() {
            tracing::warn!("Vault files may not match memory after a failed save: {}", e);
        }
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    pub fn get_account(&self, username: &str) -> Option<&Account> {
        self.users.get(username)
    }

    pub fn contains_account(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Insert a new account with an empty entry table and persist.
    ///
    /// Accounts are write-once: an existing username is a `Conflict`,
    /// which also keeps every salt immutable.
    pub fn put_account(&mut self, username: &str, account: Account) -> Result<()> {
        if self.users.contains_key(username) {
            return Err(VaultError::Conflict(format!(
                "account '{username}' already exists"
            )));
        }

        self.users.insert(username.to_string(), account);
        let created_table = !self.entries.contains_key(username);
        if created_table {
            self.entries.insert(username.to_string(), BTreeMap::new());
        }

        if let Err(e) = self.save() {
            self.users.remove(username);
            if created_table {
                self.entries.remove(username);
            }
            // users.json is written first and may already hold the account.
            self.resync_disk();
            return Err(e);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Entries
    // ------------------------------------------------------------------

    pub fn get_entry(&self, username: &str, website: &str) -> Option<&Entry> {
        self.entries.get(username)?.get(website)
    }

    /// Insert or replace the entry keyed by `entry.website` and persist.
    ///
    /// Returns the entry that was replaced, if any.
    pub fn put_entry(&mut self, username: &str, entry: Entry) -> Result<Option<Entry>> {
        if !self.users.contains_key(username) {
            return Err(VaultError::NotFound(format!("account '{username}'")));
        }

        let website = entry.website.clone();
        let table = self.entries.entry(username.to_string()).or_default();
        let previous = table.insert(website.clone(), entry);

        if let Err(e) = self.save() {
            if let Some(table) = self.entries.get_mut(username) {
                match previous {
                    Some(old) => {
                        table.insert(website, old);
                    }
                    None => {
                        table.remove(&website);
                    }
                }
            }
            return Err(e);
        }
        Ok(previous)
    }

    /// Remove the entry for `website` and persist.
    pub fn remove_entry(&mut self, username: &str, website: &str) -> Result<Entry> {
        let removed = self
            .entries
            .get_mut(username)
            .and_then(|table| table.remove(website))
            .ok_or_else(|| {
                VaultError::NotFound(format!("entry '{website}' for account '{username}'"))
            })?;

        if let Err(e) = self.save() {
            if let Some(table) = self.entries.get_mut(username) {
                table.insert(website.to_string(), removed);
            }
            return Err(e);
        }
        Ok(removed)
    }

    /// All stored entries of a user, passwords still encrypted.
    ///
    /// Unknown users have no entries.  Callers must not rely on order.
    pub fn list_entries(&self, username: &str) -> Vec<Entry> {
        self.entries
            .get(username)
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns `true` if no account has been registered.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn account_count(&self) -> usize {
        self.users.len()
    }

    /// Total number of entries across all accounts.
    pub fn entry_count(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }
}
