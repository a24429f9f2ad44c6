//! The `imgeater ingest` command: store images once without the service.

use anyhow::Context;
use clap::Args;
use imgeater_core::{Config, Dispatcher, IngestionBatch, RawStream};
use std::path::PathBuf;

/// Arguments for the `ingest` command.
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Local image file to copy in (repeatable)
    #[arg(short, long = "file")]
    pub files: Vec<PathBuf>,

    /// `data:image/<format>;base64,<data>` payload (repeatable)
    #[arg(short, long = "base64")]
    pub base64: Vec<String>,

    /// Image URL to fetch (repeatable)
    #[arg(short, long = "url")]
    pub urls: Vec<String>,

    /// Destination directory (overrides storage.files_dir)
    #[arg(short, long)]
    pub dir: Option<String>,
}

/// Execute the ingest command.
pub async fn execute(args: IngestArgs, config: Config) -> anyhow::Result<()> {
    let directory = args.dir.unwrap_or_else(|| config.files_dir());
    tokio::fs::create_dir_all(&directory)
        .await
        .with_context(|| format!("Cannot create destination directory {directory}"))?;
    let dispatcher = Dispatcher::with_directory(&config, directory)?;

    let mut streams = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Cannot open {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        streams.push(RawStream::new(name, file));
    }

    let batch = IngestionBatch {
        streams,
        base64: args.base64,
        urls: args.urls,
    };
    if batch.is_empty() {
        anyhow::bail!("Nothing to ingest: pass at least one --file, --base64 or --url");
    }

    let total = batch.len();
    let stored = dispatcher.dispatch(batch).await?;
    tracing::info!("Stored {}/{} image(s) in {}", stored, total, dispatcher.directory());
    println!("ok ({stored} stored)");
    Ok(())
}
