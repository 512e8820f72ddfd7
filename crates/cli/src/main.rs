//! Studio CLI - Main Entry Point
//!
//! Drives the "create project" flow from the terminal: signs up against the
//! configured backend when needed and reports where the flow landed.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

use commands::{config, create_project, policy};
use studio_common::config::default_config_path;
use studio_common::ClientConfig;

/// Studio CLI - signup and project creation
#[derive(Parser)]
#[command(name = "studio")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the project creation view, signing up first if needed
    CreateProject(create_project::CreateProjectArgs),

    /// Inspect the role policy
    #[command(subcommand)]
    Policy(policy::PolicyCommands),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(config::ConfigCommands),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let mut settings = ClientConfig::load(&config_path)?.with_env_overrides();
    if let Some(url) = cli.api_url {
        settings.api.base_url = url;
    }
    settings.validate()?;

    match cli.command {
        Commands::CreateProject(args) => {
            let reached = create_project::execute(args, settings, cli.format).await?;
            if !reached {
                std::process::exit(1);
            }
        }
        Commands::Policy(cmd) => policy::execute(cmd, &settings, cli.format)?,
        Commands::Config(cmd) => config::execute(cmd, &settings, &config_path, cli.format)?,
        Commands::Version => {
            println!("Studio CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Client library v{}", studio_common::VERSION);
        }
    }

    Ok(())
}
