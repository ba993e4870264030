use clap::Parser;
use tracing_subscriber::EnvFilter;

use passvault::cli::{commands, output, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG=passvault=debug for verbose output.  Secret values are
    // never logged at any level.
    let default_filter = match cli.command {
        Commands::Serve { .. } => "passvault=info",
        _ => "passvault=warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Serve {
            ref config_dir,
            ref data_dir,
            dev,
        } => commands::serve::execute(&cli, config_dir, data_dir.as_deref(), dev).await,
        Commands::Keygen { ref path } => commands::keygen::execute(path),
        Commands::Register { ref username } => commands::register::execute(&cli, username).await,
        Commands::Login { ref username } => commands::login::execute(&cli, username).await,
        Commands::Add {
            ref username,
            ref website,
            ref site_username,
        } => commands::add::execute(&cli, username, website, site_username).await,
        Commands::Update {
            ref username,
            ref website,
            ref site_username,
        } => commands::update::execute(&cli, username, website, site_username).await,
        Commands::Delete {
            ref username,
            ref website,
            force,
        } => commands::delete::execute(&cli, username, website, force).await,
        Commands::List {
            ref username,
            show,
            ref search,
        } => commands::list::execute(&cli, username, show, search.as_deref()).await,
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
