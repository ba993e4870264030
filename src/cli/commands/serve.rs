//! `passvault serve` — run the vault server.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::cli::output;
use crate::cli::Cli;
use crate::config::Settings;
use crate::errors::Result;
use crate::rpc::RpcServer;
use crate::service::VaultService;

/// Execute the `serve` command.
pub async fn execute(
    cli: &Cli,
    config_dir: &str,
    data_dir: Option<&str>,
    dev: bool,
) -> Result<()> {
    // 1. Load passvault.toml, then let flags override it.
    let mut settings = Settings::load(Path::new(config_dir))?;
    if let Some(ref host) = cli.host {
        settings.host = host.clone();
    }
    if let Some(port) = cli.port {
        settings.port = port;
    }
    if let Some(ref service) = cli.service {
        settings.service_name = service.clone();
    }
    if let Some(dir) = data_dir {
        settings.data_dir = dir.to_string();
    }
    settings.dev_mode |= dev;

    // 2. Make sure the data directory exists.
    let data_path = Path::new(&settings.data_dir);
    if !data_path.exists() {
        fs::create_dir_all(data_path)?;
        output::info(&format!("Created data directory: {}", data_path.display()));
    }

    if settings.dev_mode {
        output::warning("Development mode: built-in key and demo accounts are enabled.");
    }

    // 3. Load the vault (Argon2 seeding may take a moment).
    let service = {
        let settings = settings.clone();
        tokio::task::spawn_blocking(move || VaultService::open(&settings))
            .await
            .map_err(|e| std::io::Error::other(format!("startup task failed: {e}")))??
    };

    // 4. Bind and serve until Ctrl-C.
    let listener = RpcServer::bind(&settings.bind_address()).await?;
    output::success(&format!(
        "{} ready on {}. Press Ctrl-C to stop.",
        settings.service_name,
        listener.local_addr()?
    ));

    RpcServer::new(Arc::new(service), &settings.service_name)
        .run_until(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    output::info("Server stopped.");
    Ok(())
}
