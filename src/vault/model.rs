//! Account and Entry types held by the vault.
//!
//! An `Account` serializes as the two-element array
//! `["<password_hash>", "<salt>"]` used by `users.json`; an `Entry`
//! serializes as `{ "website", "username", "password" }`.

use serde::{Deserialize, Serialize};

/// Credentials of one registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Account {
    /// Base64 Argon2id digest of the account password.
    pub password_hash: String,

    /// Base64 salt, generated once at registration.
    pub salt: String,
}

impl From<(String, String)> for Account {
    fn from((password_hash, salt): (String, String)) -> Self {
        Self {
            password_hash,
            salt,
        }
    }
}

impl From<Account> for (String, String) {
    fn from(account: Account) -> Self {
        (account.password_hash, account.salt)
    }
}

/// One stored site credential.
///
/// `password` is plaintext on the wire to and from clients and
/// ciphertext inside the store; the service converts between the two.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub website: String,
    pub username: String,
    pub password: String,
}

impl Entry {
    pub fn new(
        website: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            website: website.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

// The password field is left out so entries can be logged safely.
impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("website", &self.website)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_serializes_as_pair() {
        let account = Account {
            password_hash: "aGFzaA==".into(),
            salt: "c2FsdA==".into(),
        };
        let json = serde_json::to_string(&account).unwrap();
        assert_eq!(json, r#"["aGFzaA==","c2FsdA=="]"#);

        let back: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(back, account);
    }

    #[test]
    fn account_rejects_wrong_arity() {
        assert!(serde_json::from_str::<Account>(r#"["only-one"]"#).is_err());
    }

    #[test]
    fn entry_uses_flat_field_names() {
        let entry = Entry::new("ex.com", "eve", "ct");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["website"], "ex.com");
        assert_eq!(value["username"], "eve");
        assert_eq!(value["password"], "ct");
    }

    #[test]
    fn entry_debug_hides_password() {
        let entry = Entry::new("ex.com", "eve", "Secret1!");
        let debug = format!("{entry:?}");
        assert!(debug.contains("ex.com"));
        assert!(!debug.contains("Secret1!"));
    }
}
