//! Input rules enforced by the service before anything is stored.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{Result, VaultError};
use crate::vault::Entry;

/// Minimum username length, in characters.
const MIN_USERNAME_LEN: usize = 3;

/// Minimum account password length, in characters.
const MIN_PASSWORD_LEN: usize = 8;

/// Allowed username characters.
const USERNAME_PATTERN: &str = r"^[A-Za-z0-9_]+$";

/// Character classes every account password must contain.
/// Each entry is (regex_pattern, message when missing).
const PASSWORD_CLASSES: &[(&str, &str)] = &[
    ("[A-Z]", "password must contain at least one uppercase letter"),
    ("[a-z]", "password must contain at least one lowercase letter"),
    ("[0-9]", "password must contain at least one digit"),
    (
        "[^A-Za-z0-9]",
        "password must contain at least one special character",
    ),
];

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(USERNAME_PATTERN).expect("username pattern is a valid regex"))
}

fn password_class_regexes() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        PASSWORD_CLASSES
            .iter()
            .map(|(pattern, message)| {
                let re = Regex::new(pattern).expect("password class is a valid regex");
                (re, *message)
            })
            .collect()
    })
}

/// Validate an account username.
///
/// Allowed: ASCII letters, digits, underscores. At least 3 characters.
pub fn validate_username(username: &str) -> Result<()> {
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(VaultError::Validation(format!(
            "username must be at least {MIN_USERNAME_LEN} characters long"
        )));
    }
    if !username_regex().is_match(username) {
        return Err(VaultError::Validation(
            "username can only contain letters, numbers, and underscores".into(),
        ));
    }
    Ok(())
}

/// Validate an account password against the complexity policy.
///
/// Reports the first rule that fails.
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(VaultError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    for (re, message) in password_class_regexes() {
        if !re.is_match(password) {
            return Err(VaultError::Validation((*message).to_string()));
        }
    }
    Ok(())
}

/// Validate the fields of an entry submitted by a client.
pub fn validate_entry(entry: &Entry) -> Result<()> {
    if entry.website.trim().is_empty() {
        return Err(VaultError::Validation("website cannot be empty".into()));
    }
    if entry.username.trim().is_empty() {
        return Err(VaultError::Validation("site username cannot be empty".into()));
    }
    Ok(())
}
