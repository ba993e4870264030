use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors that can occur in PassVault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Input errors ---
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    // --- Crypto errors ---
    #[error("Crypto error: {0}")]
    Crypto(String),

    // --- Storage errors ---
    #[error("Persistence error: {0}")]
    Persistence(String),

    // --- RPC errors ---
    #[error("Transport error: {0}")]
    Transport(String),

    // --- Config errors ---
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The error kind visible to RPC clients.
///
/// Serialized with the exact names clients match on, so a client can
/// rebuild the matching `VaultError` variant from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    ValidationError,
    AuthError,
    NotFoundError,
    ConflictError,
    CryptoError,
    PersistenceError,
    TransportError,
    ConfigError,
}

impl VaultError {
    /// Classify this error for the RPC boundary.
    ///
    /// Raw I/O failures only ever come out of the store layer, so they
    /// are reported as persistence faults.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::Auth(_) => ErrorKind::AuthError,
            Self::NotFound(_) => ErrorKind::NotFoundError,
            Self::Conflict(_) => ErrorKind::ConflictError,
            Self::Crypto(_) => ErrorKind::CryptoError,
            Self::Persistence(_) | Self::Io(_) => ErrorKind::PersistenceError,
            Self::Transport(_) => ErrorKind::TransportError,
            Self::Config(_) => ErrorKind::ConfigError,
        }
    }

    /// The message without the kind prefix that `Display` adds.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(m)
            | Self::Auth(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Crypto(m)
            | Self::Persistence(m)
            | Self::Transport(m)
            | Self::Config(m) => m.clone(),
            Self::Io(e) => e.to_string(),
        }
    }

    /// Rebuild an error from a kind and message received over the wire.
    pub fn from_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::ValidationError => Self::Validation(message),
            ErrorKind::AuthError => Self::Auth(message),
            ErrorKind::NotFoundError => Self::NotFound(message),
            ErrorKind::ConflictError => Self::Conflict(message),
            ErrorKind::CryptoError => Self::Crypto(message),
            ErrorKind::PersistenceError => Self::Persistence(message),
            ErrorKind::TransportError => Self::Transport(message),
            ErrorKind::ConfigError => Self::Config(message),
        }
    }
}

/// Convenience type alias for PassVault results.
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_from_kind() {
        let err = VaultError::NotFound("entry 'a.com' for 'alice'".into());
        let rebuilt = VaultError::from_kind(err.kind(), err.message());
        assert!(matches!(rebuilt, VaultError::NotFound(ref m) if m == "entry 'a.com' for 'alice'"));
    }

    #[test]
    fn io_errors_surface_as_persistence() {
        let err = VaultError::from(std::io::Error::other("disk full"));
        assert_eq!(err.kind(), ErrorKind::PersistenceError);
        assert_eq!(err.message(), "disk full");
    }

    #[test]
    fn kind_serializes_with_wire_names() {
        let json = serde_json::to_string(&ErrorKind::CryptoError).unwrap();
        assert_eq!(json, "\"CryptoError\"");
    }
}
