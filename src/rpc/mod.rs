//! RPC module — JSON-RPC 2.0 over TCP.
//!
//! The server side binds `VaultService` under its service name; the
//! client side is the stub front-ends use to reach it.

pub mod client;
pub mod protocol;
pub mod server;

pub use client::{VaultClient, DEFAULT_SERVICE_NAME};
pub use protocol::Operation;
pub use server::RpcServer;
