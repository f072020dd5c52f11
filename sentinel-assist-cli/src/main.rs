mod check;
mod cli;
mod stdio;

use clap::Parser;
use cli::{Cli, Command};
use sentinel_assist_core::config::load_config;
use std::error::Error;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);
    info!("Starting sentinel-assist");
    debug!(command = ?cli.command(), config = ?cli.config, "CLI arguments parsed");

    let config_path = cli.config.as_deref().map(Path::new);
    let config = load_config(config_path).map_err(|err| err.user_message())?;
    info!(
        model = config.model.kind.as_str(),
        deployment = %config.model.deployment,
        workspace = %config.workspace.id,
        "Configuration loaded"
    );

    match cli.command() {
        Command::Chat => stdio::run(&config).await?,
        Command::Check => check::run(&config).await?,
    }
    info!("sentinel-assist finished");
    Ok(())
}

fn init_tracing(quiet: bool) {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = if quiet {
            EnvFilter::new("off")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        };
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
