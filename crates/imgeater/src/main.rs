//! imgeater CLI - store images from uploads, data URIs and URLs with thumbnails.
//!
//! Every stored image gets a fixed-size `min_` thumbnail next to it. The
//! service and the one-shot `ingest` command share the same pipeline.
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP service (POST /images)
//! imgeater serve --port 4000 --dir ./files
//!
//! # Ingest without the service
//! imgeater ingest --file cat.png --url https://example.com/dog.jpg
//!
//! # View configuration
//! imgeater config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;
mod server;

/// imgeater - store images with thumbnails from multipart, base64 or URL sources.
#[derive(Parser, Debug)]
#[command(name = "imgeater")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file path (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "IMGEATER_CONFIG")]
    config: Option<PathBuf>,

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
    /// Run the HTTP ingestion service
    Serve(cli::serve::ServeArgs),

    /// Ingest files, data URIs or URLs once and exit
    Ingest(cli::ingest::IngestArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(imgeater_core::Config::default_path);

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match imgeater_core::Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config '{}': {e}\n  \
                 Using default configuration.",
                config_path.display()
            );
            imgeater_core::Config::default()
        }
    };
    logging::init(&logging::LogSettings::resolve(&config, cli.verbose, cli.json_logs));

    tracing::debug!("imgeater v{}", imgeater_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Ingest(args) => cli::ingest::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config, &config_path).await,
    }
}
