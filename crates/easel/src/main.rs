//! Easel CLI - Batch client for remote image generation.
//!
//! Easel submits generation jobs to a remote drawing API and renders their
//! progress live: elapsed time, streamed progress percentages, terminal
//! outcomes, and auto-retry countdowns.
//!
//! # Usage
//!
//! ```bash
//! # Generate one image
//! easel generate "a cat in a spacesuit"
//!
//! # Four jobs in parallel with two reference images and auto-retry
//! easel generate "same cat, oil painting" -b 4 -i cat1.png -i cat2.png --auto-retry
//!
//! # Check the account balance
//! easel credits
//!
//! # View configuration
//! easel config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Easel - Batch client for remote image generation.
#[derive(Parser, Debug)]
#[command(name = "easel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit generation jobs and render their progress
    Generate(cli::generate::GenerateArgs),

    /// Show the account's remaining credits
    Credits(cli::credits::CreditsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match easel_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `easel config path`."
            );
            easel_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Easel v{}", easel_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Generate(args) => cli::generate::execute(args, config).await,
        Commands::Credits(args) => cli::credits::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
