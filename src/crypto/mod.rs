//! Cryptographic primitives for PassVault.
//!
//! This module provides:
//! - Argon2id salted account password hashing (`hasher`)
//! - AES-256-GCM encryption of stored site passwords (`cipher`)
//! - The HKDF-derived, zeroize-on-drop entry key (`keys`)

pub mod cipher;
pub mod hasher;
pub mod keys;

pub use cipher::EntryCipher;
pub use hasher::{Argon2Params, PasswordHasher};
pub use keys::{generate_key_file, load_key_file, EntryKey};
