//! Vault module — account and entry storage.
//!
//! This module provides:
//! - `Account` and `Entry` types (`model`)
//! - The two JSON documents and their atomic writes (`format`)
//! - The in-memory `VaultStore` mirrored to disk (`store`)

pub mod format;
pub mod model;
pub mod store;

// Re-export the most commonly used items.
pub use model::{Account, Entry};
pub use store::VaultStore;
