//! JSON-RPC 2.0 messages exchanged between the client stub and the
//! endpoint.
//!
//! One request or response per line.  Methods are addressed as
//! `<service_name>.<operation>`, e.g. `PasswordManagerService.login`.
//! Vault errors travel as JSON-RPC error objects carrying an
//! application code and `data.kind`, so the client can rebuild the
//! same `VaultError` variant.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ErrorKind, VaultError};
use crate::vault::Entry;

/// A JSON-RPC 2.0 request.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    pub id: Value,
}

/// A JSON-RPC 2.0 success/error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// Standard JSON-RPC 2.0 error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// Application error code for each vault error kind.
pub fn error_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::ValidationError => -32010,
        ErrorKind::AuthError => -32011,
        ErrorKind::NotFoundError => -32012,
        ErrorKind::ConflictError => -32013,
        ErrorKind::CryptoError => -32014,
        ErrorKind::PersistenceError => -32015,
        ErrorKind::TransportError => -32016,
        ErrorKind::ConfigError => -32017,
    }
}

// ─── Operations ──────────────────────────────────────────────────────────────

/// The operations of the vault service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    Login,
    AddPassword,
    UpdatePassword,
    DeletePassword,
    ListPasswords,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Register,
        Operation::Login,
        Operation::AddPassword,
        Operation::UpdatePassword,
        Operation::DeletePassword,
        Operation::ListPasswords,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Login => "login",
            Self::AddPassword => "add_password",
            Self::UpdatePassword => "update_password",
            Self::DeletePassword => "delete_password",
            Self::ListPasswords => "list_passwords",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    /// Whether repeating the call after a lost response is harmless.
    ///
    /// `register` would report `false` and `delete_password` would
    /// report `NotFound` the second time, so they are never retried.
    pub fn is_idempotent(self) -> bool {
        !matches!(self, Self::Register | Self::DeletePassword)
    }

    /// Full method name for `service_name`.
    pub fn method(self, service_name: &str) -> String {
        format!("{service_name}.{}", self.as_str())
    }

    /// Resolve a full method name, checking the service prefix.
    pub fn resolve(method: &str, service_name: &str) -> Option<Self> {
        let (service, op) = method.split_once('.')?;
        if service != service_name {
            return None;
        }
        Self::from_name(op)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Params ──────────────────────────────────────────────────────────────────

/// Params of `register` and `login`.
#[derive(Serialize, Deserialize)]
pub struct CredentialsParams {
    pub username: String,
    pub password: String,
}

/// Params of `add_password` and `update_password`.
#[derive(Serialize, Deserialize)]
pub struct EntryParams {
    pub username: String,
    pub entry: Entry,
}

/// Params of `delete_password`.
#[derive(Serialize, Deserialize)]
pub struct WebsiteParams {
    pub username: String,
    pub website: String,
}

/// Params of `list_passwords`.
#[derive(Serialize, Deserialize)]
pub struct UserParams {
    pub username: String,
}

// ─── Constructors / conversions ──────────────────────────────────────────────

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Value, id: u64) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
            id: Value::from(id),
        }
    }

    /// Validate that this is a proper JSON-RPC 2.0 request.
    pub fn validate(&self) -> Result<(), String> {
        if self.jsonrpc != "2.0" {
            return Err("jsonrpc must be \"2.0\"".to_string());
        }
        if self.method.is_empty() {
            return Err("method must not be empty".to_string());
        }
        Ok(())
    }
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response.
    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
            id,
        }
    }

    /// Create a parse error response (id is null because we couldn't parse it).
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::error(Value::Null, PARSE_ERROR, message)
    }

    /// Create an error response tagged with the vault error kind.
    pub fn vault_error(id: Value, err: &VaultError) -> Self {
        let kind = err.kind();
        let mut response = Self::error(id, error_code(kind), err.message());
        if let Some(ref mut error) = response.error {
            error.data = Some(serde_json::json!({ "kind": kind }));
        }
        response
    }

    /// Split into the result value or the error it carries.
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

impl JsonRpcError {
    /// Rebuild the vault error this object was produced from.
    ///
    /// Protocol-level errors without a kind become `Validation` for
    /// bad params and `Transport` for everything else.
    pub fn into_vault_error(self) -> VaultError {
        let kind = self
            .data
            .as_ref()
            .and_then(|data| data.get("kind"))
            .and_then(|kind| serde_json::from_value::<ErrorKind>(kind.clone()).ok());

        match kind {
            Some(kind) => VaultError::from_kind(kind, self.message),
            None if self.code == INVALID_PARAMS => VaultError::Validation(self.message),
            None => VaultError::Transport(format!("RPC error {}: {}", self.code, self.message)),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_request() {
        let json = r#"{"jsonrpc":"2.0","method":"PasswordManagerService.login","params":{"username":"a","password":"b"},"id":1}"#;
        let req: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.method, "PasswordManagerService.login");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_parse_request_without_params() {
        let json = r#"{"jsonrpc":"2.0","method":"x.list_passwords","id":1}"#;
        let req: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.params, Value::Null);
    }

    #[test]
    fn test_invalid_jsonrpc_version() {
        let json = r#"{"jsonrpc":"1.0","method":"x.login","params":{},"id":1}"#;
        let req: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_resolve_checks_service_prefix() {
        let svc = "PasswordManagerService";
        assert_eq!(
            Operation::resolve("PasswordManagerService.add_password", svc),
            Some(Operation::AddPassword)
        );
        assert_eq!(Operation::resolve("OtherService.add_password", svc), None);
        assert_eq!(Operation::resolve("PasswordManagerService.drop_all", svc), None);
        assert_eq!(Operation::resolve("add_password", svc), None);
    }

    #[test]
    fn test_method_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(Operation::resolve(&op.method("svc"), "svc"), Some(op));
        }
    }

    #[test]
    fn test_only_register_and_delete_are_not_retried() {
        assert!(!Operation::Register.is_idempotent());
        assert!(!Operation::DeletePassword.is_idempotent());
        assert!(Operation::Login.is_idempotent());
        assert!(Operation::UpdatePassword.is_idempotent());
    }

    #[test]
    fn test_vault_error_response_carries_kind() {
        let err = VaultError::NotFound("entry 'none.com' for account 'alice'".into());
        let resp = JsonRpcResponse::vault_error(Value::from(7), &err);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"NotFoundError\""));
        assert!(json.contains("-32012"));
        assert!(!json.contains("\"result\""));

        let back: JsonRpcResponse = serde_json::from_str(&json).unwrap();
        let rebuilt = back.into_result().unwrap_err().into_vault_error();
        assert!(matches!(rebuilt, VaultError::NotFound(_)));
    }

    #[test]
    fn test_untagged_errors_map_by_code() {
        let bad_params = JsonRpcError {
            code: INVALID_PARAMS,
            message: "missing field `username`".into(),
            data: None,
        };
        assert!(matches!(
            bad_params.into_vault_error(),
            VaultError::Validation(_)
        ));

        let unknown = JsonRpcError {
            code: METHOD_NOT_FOUND,
            message: "Unknown method".into(),
            data: None,
        };
        assert!(matches!(unknown.into_vault_error(), VaultError::Transport(_)));
    }

    #[test]
    fn test_null_result_is_success() {
        let json = r#"{"jsonrpc":"2.0","result":null,"id":3}"#;
        let resp: JsonRpcResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.into_result().unwrap(), Value::Null);
    }

    #[test]
    fn test_parse_error_has_null_id() {
        let resp = JsonRpcResponse::parse_error("bad json");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"id\":null"));
        assert!(json.contains("-32700"));
    }
}
