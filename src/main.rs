//! Binary entry point for asclepius.
//!
//! This binary provides the CLI interface for classification, history, and
//! health news.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
// Allow option_if_let_else for environment variable fallback chains
#![allow(clippy::option_if_let_else)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use asclepius::cli::{
    ClassifyArgs, HistoryAction, cmd_classify, cmd_config, cmd_history, cmd_news, cmd_status,
};
use asclepius::config::AsclepiusConfig;
use asclepius::observability;
use asclepius::rendering::OutputFormat;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

/// Asclepius - On-device cancer image classification.
#[derive(Parser)]
#[command(name = "asclepius")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Classify an image.
    Classify(ClassifyArgs),

    /// Browse saved results.
    History {
        /// History subcommand.
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Fetch health news.
    News {
        /// Output format.
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Show status.
    Status,

    /// Manage configuration.
    Config {
        /// Show current configuration.
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_settings(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

async fn run_command(command: Commands, config: AsclepiusConfig) -> asclepius::Result<()> {
    match command {
        Commands::Classify(args) => cmd_classify(config, args).await,
        Commands::History { action } => cmd_history(config, action).await,
        Commands::News { format } => cmd_news(config, format).await,
        Commands::Status => cmd_status(&config),
        Commands::Config { show } => cmd_config(config, show),
    }
}

fn load_config(path: Option<&str>) -> asclepius::Result<AsclepiusConfig> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // If a path is provided, load from that file
    if let Some(config_path) = path {
        return Ok(
            AsclepiusConfig::load_from_file(std::path::Path::new(config_path))?
                .with_env_overrides(),
        );
    }

    // Environment override for config path
    if let Ok(config_path) = std::env::var("ASCLEPIUS_CONFIG_PATH") {
        if !config_path.trim().is_empty() {
            return Ok(
                AsclepiusConfig::load_from_file(std::path::Path::new(&config_path))?
                    .with_env_overrides(),
            );
        }
    }

    // Otherwise, load from default location
    Ok(AsclepiusConfig::load_default().with_env_overrides())
}
