//! Integration tests for the PassVault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Interactive prompts are bypassed with `PASSVAULT_PASSWORD`; the
//! full client/server round trip is covered in `rpc_tests.rs`.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Helper: get a Command pointing at the passvault binary.
fn passvault() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("passvault").expect("binary should exist");
    for var in [
        "PASSVAULT_KEY",
        "PASSVAULT_HOST",
        "PASSVAULT_PORT",
        "PASSVAULT_SERVICE",
        "PASSVAULT_PASSWORD",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// A loopback port with nothing listening on it.
fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn help_flag_shows_usage() {
    passvault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Client/server password vault"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("keygen"))
        .stdout(predicate::str::contains("register"))
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn version_flag_shows_version() {
    passvault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("passvault"));
}

#[test]
fn no_args_shows_help() {
    passvault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn add_requires_site_username() {
    passvault()
        .args(["add", "alice", "ex.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SITE_USERNAME"));
}

#[test]
fn keygen_writes_key_file() {
    let tmp = TempDir::new().unwrap();
    let key = tmp.child("keys").child("entry.key");

    passvault()
        .args(["keygen", key.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entry key written"));

    key.assert(predicate::path::is_file());
    assert_eq!(std::fs::read(key.path()).unwrap().len(), 32);
}

#[test]
fn keygen_refuses_to_overwrite() {
    let tmp = TempDir::new().unwrap();
    let key = tmp.child("entry.key");
    key.write_binary(b"existing key material").unwrap();

    passvault()
        .args(["keygen", key.path().to_str().unwrap()])
        .assert()
        .failure();

    assert_eq!(std::fs::read(key.path()).unwrap(), b"existing key material");
}

#[test]
fn serve_without_entry_key_fails() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().to_str().unwrap();

    passvault()
        .args(["serve", "--config-dir", dir, "--data-dir", dir])
        .args(["--host", "127.0.0.1", "--port", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no entry key configured"));
}

#[test]
fn serve_rejects_malformed_config() {
    let tmp = TempDir::new().unwrap();
    tmp.child("passvault.toml")
        .write_str("port = \"not a number\"")
        .unwrap();

    passvault()
        .args(["serve", "--config-dir", tmp.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config error"));
}

#[test]
fn login_without_server_reports_transport_error() {
    let port = closed_port().to_string();

    passvault()
        .args(["login", "alice", "--host", "127.0.0.1", "--port", &port])
        .env("PASSVAULT_PASSWORD", "Str0ng!Pass")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Transport error"));
}

#[test]
fn list_without_server_reports_transport_error() {
    let port = closed_port().to_string();

    passvault()
        .args(["list", "alice", "--host", "127.0.0.1", "--port", &port])
        .env("PASSVAULT_PASSWORD", "Str0ng!Pass")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Transport error"));
}

#[test]
fn list_help_shows_search_option() {
    passvault()
        .args(["list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--search"))
        .stdout(predicate::str::contains("website or site username"));
}
