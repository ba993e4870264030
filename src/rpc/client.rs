//! Client stub: the caller-side facade over the RPC endpoint.
//!
//! Exposes the same operations as `VaultService`.  Holds one cached
//! connection; when a call fails at the transport level the connection
//! is dropped and the next call reconnects.  Idempotent operations are
//! retried once on a fresh connection right away.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::errors::{Result, VaultError};
use crate::vault::Entry;

use super::protocol::{
    CredentialsParams, EntryParams, JsonRpcRequest, JsonRpcResponse, Operation, UserParams,
    WebsiteParams,
};

/// Default service name.
pub const DEFAULT_SERVICE_NAME: &str = "PasswordManagerService";

struct Connection {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Connection {
    async fn open(address: &str) -> Result<Self> {
        let stream = TcpStream::connect(address)
            .await
            .map_err(|e| VaultError::Transport(format!("cannot connect to {address}: {e}")))?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            lines: BufReader::new(reader).lines(),
            writer,
        })
    }

    async fn round_trip(&mut self, request: &JsonRpcRequest) -> Result<JsonRpcResponse> {
        let mut json = serde_json::to_string(request)
            .map_err(|e| VaultError::Transport(format!("cannot encode request: {e}")))?;
        json.push('\n');

        self.writer
            .write_all(json.as_bytes())
            .await
            .map_err(|e| VaultError::Transport(format!("send failed: {e}")))?;
        self.writer
            .flush()
            .await
            .map_err(|e| VaultError::Transport(format!("send failed: {e}")))?;

        let line = self
            .lines
            .next_line()
            .await
            .map_err(|e| VaultError::Transport(format!("receive failed: {e}")))?
            .ok_or_else(|| VaultError::Transport("connection closed by server".into()))?;

        serde_json::from_str(&line)
            .map_err(|e| VaultError::Transport(format!("malformed response: {e}")))
    }
}

/// Remote handle to a PassVault server.
pub struct VaultClient {
    address: String,
    service_name: String,
    connection: Mutex<Option<Connection>>,
    next_id: AtomicU64,
}

impl VaultClient {
    /// Create a client without connecting; the first call connects.
    pub fn new(address: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            service_name: service_name.into(),
            connection: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a client and connect immediately, failing fast if the
    /// server is unreachable.
    pub async fn connect(address: impl Into<String>, service_name: impl Into<String>) -> Result<Self> {
        let client = Self::new(address, service_name);
        let conn = Connection::open(&client.address).await?;
        *client.connection.lock().await = Some(conn);
        Ok(client)
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    pub async fn register(&self, username: &str, password: &str) -> Result<bool> {
        let params = to_params(&CredentialsParams {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        expect_bool(self.call(Operation::Register, params).await?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<bool> {
        let params = to_params(&CredentialsParams {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        expect_bool(self.call(Operation::Login, params).await?)
    }

    pub async fn add_password(&self, username: &str, entry: &Entry) -> Result<()> {
        let params = to_params(&EntryParams {
            username: username.to_string(),
            entry: entry.clone(),
        })?;
        self.call(Operation::AddPassword, params).await?;
        Ok(())
    }

    pub async fn update_password(&self, username: &str, entry: &Entry) -> Result<()> {
        let params = to_params(&EntryParams {
            username: username.to_string(),
            entry: entry.clone(),
        })?;
        self.call(Operation::UpdatePassword, params).await?;
        Ok(())
    }

    pub async fn delete_password(&self, username: &str, website: &str) -> Result<()> {
        let params = to_params(&WebsiteParams {
            username: username.to_string(),
            website: website.to_string(),
        })?;
        self.call(Operation::DeletePassword, params).await?;
        Ok(())
    }

    pub async fn list_passwords(&self, username: &str) -> Result<Vec<Entry>> {
        let params = to_params(&UserParams {
            username: username.to_string(),
        })?;
        let result = self.call(Operation::ListPasswords, params).await?;
        serde_json::from_value(result)
            .map_err(|e| VaultError::Transport(format!("malformed entry list: {e}")))
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    /// Perform one call, reconnecting on transport failure.
    async fn call(&self, op: Operation, params: Value) -> Result<Value> {
        let method = op.method(&self.service_name);
        let mut slot = self.connection.lock().await;

        let first = self.call_on(&mut slot, &method, params.clone()).await;
        match first {
            Err(VaultError::Transport(reason)) if op.is_idempotent() => {
                tracing::debug!(operation = %op, %reason, "Transport failure, retrying on a fresh connection");
                self.call_on(&mut slot, &method, params).await
            }
            other => other,
        }
    }

    /// Send one request over the cached connection, opening it if
    /// needed.  The connection is discarded on any transport failure.
    async fn call_on(
        &self,
        slot: &mut Option<Connection>,
        method: &str,
        params: Value,
    ) -> Result<Value> {
        if slot.is_none() {
            *slot = Some(Connection::open(&self.address).await?);
        }
        let Some(conn) = slot.as_mut() else {
            return Err(VaultError::Transport("no connection".into()));
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(method, params, id);

        let response = match conn.round_trip(&request).await {
            Ok(response) => response,
            Err(e) => {
                *slot = None;
                return Err(e);
            }
        };

        if response.id != request.id {
            *slot = None;
            return Err(VaultError::Transport(format!(
                "response id {} does not match request id {id}",
                response.id
            )));
        }

        response.into_result().map_err(|e| e.into_vault_error())
    }
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("address", &self.address)
            .field("service_name", &self.service_name)
            .finish_non_exhaustive()
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn to_params<T: serde::Serialize>(params: &T) -> Result<Value> {
    serde_json::to_value(params)
        .map_err(|e| VaultError::Transport(format!("cannot encode params: {e}")))
}

fn expect_bool(value: Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| VaultError::Transport(format!("expected a boolean result, got {value}")))
}
