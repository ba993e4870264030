//! Server configuration (`passvault.toml`).

pub mod settings;

pub use settings::{Settings, KEY_ENV_VAR};
