//! RPC endpoint: TCP listener serving the vault service.
//!
//! Listens for newline-delimited JSON-RPC 2.0 requests.  Each
//! connection is handled in a spawned tokio task; each request runs
//! the synchronous service call on the blocking pool so that disk
//! writes never stall the reactor.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::errors::{Result, VaultError};
use crate::service::VaultService;

use super::protocol::{
    CredentialsParams, EntryParams, JsonRpcRequest, JsonRpcResponse, Operation, UserParams,
    WebsiteParams, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
};

/// Largest request line the endpoint accepts, in bytes.
pub const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// The vault service bound to a well-known name.
pub struct RpcServer {
    service: Arc<VaultService>,
    service_name: Arc<str>,
}

impl RpcServer {
    pub fn new(service: Arc<VaultService>, service_name: &str) -> Self {
        Self {
            service,
            service_name: Arc::from(service_name),
        }
    }

    /// Bind the listening socket.
    pub async fn bind(addr: &str) -> Result<TcpListener> {
        TcpListener::bind(addr)
            .await
            .map_err(|e| VaultError::Transport(format!("cannot bind {addr}: {e}")))
    }

    /// Serve until the process is terminated.
    pub async fn run(self, listener: TcpListener) -> Result<()> {
        self.run_until(listener, std::future::pending()).await
    }

    /// Serve until `shutdown` completes.
    ///
    /// Sessions already in flight keep running on their own tasks.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let local = listener.local_addr()?;
        tracing::info!(
            address = %local,
            service = %self.service_name,
            "PassVault RPC endpoint listening"
        );

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!("Accept failed: {}", e);
                            continue;
                        }
                    };
                    let service = Arc::clone(&self.service);
                    let service_name = Arc::clone(&self.service_name);

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, peer, service, service_name).await {
                            tracing::error!(%peer, "Connection handler error: {}", e);
                        }
                    });
                }
                () = &mut shutdown => {
                    tracing::info!("Shutdown requested, no longer accepting connections");
                    return Ok(());
                }
            }
        }
    }
}

/// One framed read from a session.
enum Frame {
    /// A complete request line, newline stripped.
    Line(Vec<u8>),
    /// A line longer than `MAX_REQUEST_BYTES`; its bytes were discarded.
    TooLong,
    Eof,
}

/// Read the next newline-terminated request, never buffering more than
/// `MAX_REQUEST_BYTES` of it.
async fn read_frame<R>(reader: &mut R) -> std::io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = (&mut *reader)
        .take(MAX_REQUEST_BYTES as u64 + 1)
        .read_until(b'\n', &mut buf)
        .await?;
    if n == 0 {
        return Ok(Frame::Eof);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        return Ok(Frame::Line(buf));
    }
    if buf.len() <= MAX_REQUEST_BYTES {
        // Final line without a trailing newline.
        return Ok(Frame::Line(buf));
    }

    // Skip the rest of the oversized line so the session stays in sync.
    loop {
        buf.clear();
        let n = (&mut *reader)
            .take(MAX_REQUEST_BYTES as u64)
            .read_until(b'\n', &mut buf)
            .await?;
        if n == 0 || buf.last() == Some(&b'\n') {
            return Ok(Frame::TooLong);
        }
    }
}

/// Handle a single client session.
/// Reads newline-delimited JSON-RPC requests and writes responses.
async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    service: Arc<VaultService>,
    service_name: Arc<str>,
) -> std::io::Result<()> {
    tracing::debug!(%peer, "Client connected");

    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    loop {
        let response = match read_frame(&mut reader).await? {
            Frame::Eof => break,
            Frame::TooLong => {
                tracing::warn!(%peer, limit = MAX_REQUEST_BYTES, "Request too large, discarded");
                JsonRpcResponse::parse_error(format!(
                    "Parse error: request exceeds {MAX_REQUEST_BYTES} bytes"
                ))
            }
            Frame::Line(bytes) => match String::from_utf8(bytes) {
                Err(_) => JsonRpcResponse::parse_error("Parse error: request is not valid UTF-8"),
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => {
                    let service = Arc::clone(&service);
                    let service_name = Arc::clone(&service_name);
                    tokio::task::spawn_blocking(move || {
                        process_request(&line, &service, &service_name)
                    })
                    .await
                    .unwrap_or_else(|e| {
                        tracing::error!(%peer, "Request task failed: {}", e);
                        JsonRpcResponse::error(Value::Null, INTERNAL_ERROR, "internal server error")
                    })
                }
            },
        };

        let mut json = serde_json::to_string(&response)?;
        json.push('\n');
        writer.write_all(json.as_bytes()).await?;
        writer.flush().await?;
    }

    tracing::debug!(%peer, "Client disconnected");
    Ok(())
}

/// Parse and dispatch a single JSON-RPC request.
pub fn process_request(raw: &str, service: &VaultService, service_name: &str) -> JsonRpcResponse {
    let request: JsonRpcRequest = match serde_json::from_str(raw) {
        Ok(req) => req,
        Err(e) => return JsonRpcResponse::parse_error(format!("Parse error: {}", e)),
    };

    if let Err(e) = request.validate() {
        return JsonRpcResponse::error(request.id, INVALID_REQUEST, e);
    }

    let Some(op) = Operation::resolve(&request.method, service_name) else {
        return JsonRpcResponse::error(
            request.id,
            METHOD_NOT_FOUND,
            format!("Unknown method: {}", request.method),
        );
    };

    tracing::debug!(operation = %op, "Dispatching request");
    match dispatch(service, op, request.params) {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(DispatchError::Params(message)) => {
            JsonRpcResponse::error(request.id, INVALID_PARAMS, message)
        }
        Err(DispatchError::Vault(e)) => {
            tracing::warn!(operation = %op, kind = ?e.kind(), "Request failed: {}", e);
            JsonRpcResponse::vault_error(request.id, &e)
        }
    }
}

// ─── Method Handlers ─────────────────────────────────────────────────────────

enum DispatchError {
    Params(String),
    Vault(VaultError),
}

impl From<VaultError> for DispatchError {
    fn from(e: VaultError) -> Self {
        Self::Vault(e)
    }
}

fn dispatch(
    service: &VaultService,
    op: Operation,
    params: Value,
) -> std::result::Result<Value, DispatchError> {
    let result = match op {
        Operation::Register => {
            let p: CredentialsParams = parse_params(params)?;
            Value::Bool(service.register(&p.username, &p.password)?)
        }
        Operation::Login => {
            let p: CredentialsParams = parse_params(params)?;
            Value::Bool(service.login(&p.username, &p.password)?)
        }
        Operation::AddPassword => {
            let p: EntryParams = parse_params(params)?;
            service.add_password(&p.username, &p.entry)?;
            Value::Null
        }
        Operation::UpdatePassword => {
            let p: EntryParams = parse_params(params)?;
            service.update_password(&p.username, &p.entry)?;
            Value::Null
        }
        Operation::DeletePassword => {
            let p: WebsiteParams = parse_params(params)?;
            service.delete_password(&p.username, &p.website)?;
            Value::Null
        }
        Operation::ListPasswords => {
            let p: UserParams = parse_params(params)?;
            let entries = service.list_passwords(&p.username)?;
            serde_json::to_value(entries).map_err(|e| {
                DispatchError::Vault(VaultError::Transport(format!(
                    "cannot encode entries: {e}"
                )))
            })?
        }
    };
    Ok(result)
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn parse_params<T: DeserializeOwned>(params: Value) -> std::result::Result<T, DispatchError> {
    serde_json::from_value(params)
        .map_err(|e| DispatchError::Params(format!("Invalid params: {e}")))
}
