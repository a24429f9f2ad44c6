//! The `imgeater serve` command: run the HTTP ingestion service.

use clap::Args;
use imgeater_core::{Config, Dispatcher};
use std::sync::Arc;

use crate::server::{router, shutdown_signal, AppState};

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Destination directory (overrides storage.files_dir)
    #[arg(short, long)]
    pub dir: Option<String>,
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, config: Config) -> anyhow::Result<()> {
    let port = args.port.unwrap_or(config.server.port);
    let directory = args.dir.unwrap_or_else(|| config.files_dir());

    tokio::fs::create_dir_all(&directory).await?;
    let dispatcher = Dispatcher::with_directory(&config, directory)?;

    let state = Arc::new(AppState {
        dispatcher,
        files_field: config.server.files_field.clone(),
    });

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        addr = %addr,
        files_dir = %state.dispatcher.directory(),
        files_field = %state.files_field,
        "Starting HTTP server"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
