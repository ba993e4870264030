use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::keys::{self, EntryKey, DEV_KEY_MATERIAL};
use crate::crypto::Argon2Params;
use crate::errors::{Result, VaultError};

/// Environment variable holding the entry key material.
pub const KEY_ENV_VAR: &str = "PASSVAULT_KEY";

/// Server configuration, loaded from `passvault.toml`.
///
/// Every field has a sensible default so the server starts without
/// any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Host the RPC endpoint binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port of the RPC endpoint.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Name the service is addressed by in RPC method names.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Directory holding the two vault documents.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_users_file")]
    pub users_file: String,

    #[serde(default = "default_passwords_file")]
    pub passwords_file: String,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// File holding the entry key material (see `passvault keygen`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,

    /// Development mode: built-in entry key and demo accounts.
    #[serde(default)]
    pub dev_mode: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    1099
}

fn default_service_name() -> String {
    "PasswordManagerService".to_string()
}

fn default_data_dir() -> String {
    ".".to_string()
}

fn default_users_file() -> String {
    "users.json".to_string()
}

fn default_passwords_file() -> String {
    "passwords.json".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            service_name: default_service_name(),
            data_dir: default_data_dir(),
            users_file: default_users_file(),
            passwords_file: default_passwords_file(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            key_file: None,
            dev_mode: false,
        }
    }
}

impl Settings {
    /// Name of the config file we look for.
    pub const FILE_NAME: &'static str = "passvault.toml";

    /// Load settings from `<config_dir>/passvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// `host:port` for the RPC endpoint.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn users_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.users_file)
    }

    pub fn passwords_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.passwords_file)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Resolve the entry key from the process environment.
    pub fn entry_key(&self) -> Result<EntryKey> {
        let from_env = std::env::var(KEY_ENV_VAR).ok().map(Zeroizing::new);
        self.entry_key_from(from_env)
    }

    /// Resolve the entry key, trying in order:
    /// 1. `env_material` (the `PASSVAULT_KEY` value)
    /// 2. `key_file`
    /// 3. the built-in development key, only in `dev_mode`
    pub fn entry_key_from(&self, env_material: Option<Zeroizing<String>>) -> Result<EntryKey> {
        if let Some(material) = env_material.filter(|m| !m.is_empty()) {
            return EntryKey::from_material(material.as_bytes());
        }

        if let Some(ref path) = self.key_file {
            let material = Zeroizing::new(keys::load_key_file(Path::new(path))?);
            return EntryKey::from_material(&material);
        }

        if self.dev_mode {
            tracing::warn!("Using the built-in development entry key; do not use in production");
            return EntryKey::from_material(DEV_KEY_MATERIAL);
        }

        Err(VaultError::Config(format!(
            "no entry key configured: set {KEY_ENV_VAR}, set `key_file` in {}, or run with --dev",
            Self::FILE_NAME
        )))
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.bind_address(), "localhost:1099");
        assert_eq!(s.service_name, "PasswordManagerService");
        assert_eq!(s.users_path(), PathBuf::from("./users.json"));
        assert_eq!(s.passwords_path(), PathBuf::from("./passwords.json"));
        assert_eq!(s.argon2_params(), Argon2Params::default());
        assert!(!s.dev_mode);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.port, 1099);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
host = "0.0.0.0"
port = 4040
data_dir = "/var/lib/passvault"
argon2_memory_kib = 131072
key_file = "/etc/passvault/key"
dev_mode = true
"#;
        fs::write(tmp.path().join("passvault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.bind_address(), "0.0.0.0:4040");
        assert_eq!(
            settings.users_path(),
            PathBuf::from("/var/lib/passvault/users.json")
        );
        assert_eq!(settings.argon2_memory_kib, 131_072);
        assert_eq!(settings.argon2_iterations, 3);
        assert_eq!(settings.key_file.as_deref(), Some("/etc/passvault/key"));
        assert!(settings.dev_mode);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("passvault.toml"), "port = \"not a number").unwrap();
        assert!(matches!(
            Settings::load(tmp.path()),
            Err(VaultError::Config(_))
        ));
    }

    #[test]
    fn entry_key_requires_configuration_outside_dev_mode() {
        let s = Settings::default();
        assert!(matches!(s.entry_key_from(None), Err(VaultError::Config(_))));
    }

    #[test]
    fn entry_key_prefers_env_material() {
        let s = Settings {
            dev_mode: true,
            ..Settings::default()
        };
        let env_key = s
            .entry_key_from(Some(Zeroizing::new("an operator supplied key".into())))
            .unwrap();
        let dev_key = s.entry_key_from(None).unwrap();
        assert_ne!(env_key.as_bytes(), dev_key.as_bytes());
    }

    #[test]
    fn entry_key_reads_key_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("entry.key");
        keys::generate_key_file(&path).unwrap();

        let s = Settings {
            key_file: Some(path.to_string_lossy().into_owned()),
            ..Settings::default()
        };
        let first = s.entry_key_from(None).unwrap();
        let second = s.entry_key_from(None).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }
}
