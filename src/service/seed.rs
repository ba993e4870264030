//! Demo accounts for development builds.
//!
//! Only used when `dev_mode` is on and the vault is empty.  The demo
//! passwords are well known and deliberately bypass the password
//! policy, so they must never reach a production vault.

use crate::errors::Result;
use crate::vault::{Account, Entry};

use super::VaultService;

/// (username, password) of each demo account.
const DEMO_ACCOUNTS: &[(&str, &str)] = &[("user1", "password123"), ("admin", "adminpass")];

/// (owner, website, site username, site password) of each demo entry.
const DEMO_ENTRIES: &[(&str, &str, &str, &str)] = &[
    ("user1", "google.com", "user1_google", "googlepass"),
    ("user1", "facebook.com", "user1_fb", "fbpass"),
];

impl VaultService {
    /// Populate an empty vault with the demo accounts and entries.
    pub fn seed_demo_data(&self) -> Result<()> {
        for (username, password) in DEMO_ACCOUNTS {
            let salt = self.hasher.generate_salt()?;
            let password_hash = self.hasher.hash(password, &salt)?;
            self.write_store().put_account(
                username,
                Account {
                    password_hash,
                    salt,
                },
            )?;
        }

        for (owner, website, site_username, site_password) in DEMO_ENTRIES {
            let sealed = Entry::new(
                *website,
                *site_username,
                self.cipher.encrypt(site_password)?,
            );
            self.write_store().put_entry(owner, sealed)?;
        }

        tracing::warn!(
            accounts = DEMO_ACCOUNTS.len(),
            entries = DEMO_ENTRIES.len(),
            "Seeded demo accounts (dev mode); do not use in production"
        );
        Ok(())
    }
}
