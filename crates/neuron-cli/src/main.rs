//! neuron - Command-line tool for neuron JSON:API servers
//!
//! Loads a client configuration, checks the server's health and prints the
//! resolved endpoint base URL.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use neuron_client::{ClientConfig, NeuronClient};
use neuron_core::Controller;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "neuron")]
#[command(author, version, about = "Neuron JSON:API client tool")]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path (.toml, .yaml or .yml)
    #[arg(short, long, env = "NEURON_CONFIG", conflicts_with_all = ["name", "dir"])]
    config: Option<PathBuf>,

    /// Configuration name, resolved as <dir>/<name>.{toml,yaml,yml}
    #[arg(short, long, default_value = "client")]
    name: String,

    /// Directory searched for the named configuration
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and check server health
    Check,

    /// Print the endpoint base URL without contacting the server
    Url,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let config = load_config(&cli)?;
    debug!(hostname = %config.hostname, port = config.port, "Loaded configuration");

    match cli.command {
        Commands::Check => {
            let base_url = config.base_url();
            NeuronClient::new(Controller::builder().build_shared(), config)
                .await
                .with_context(|| format!("Server at {} is not healthy", base_url))?;
            println!("healthy");
        }

        Commands::Url => {
            println!("{}", config.base_url());
        }
    }

    Ok(())
}

/// Load the client configuration from `--config` or `--name`/`--dir`
fn load_config(cli: &Cli) -> Result<ClientConfig> {
    match &cli.config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display())),
        None => ClientConfig::read(&cli.name, &cli.dir).with_context(|| {
            format!(
                "Failed to find config '{}' in {}",
                cli.name,
                cli.dir.display()
            )
        }),
    }
}
