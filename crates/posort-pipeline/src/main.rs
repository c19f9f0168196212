//! posort - PDF relocation pipeline

use anyhow::Result;
use clap::Parser;
use posort_common::logging::{init_logging, LogConfig, LogLevel};
use posort_pipeline::{config::AppConfig, driver::PipelineDriver};
use posort_storage::{S3BlobStorage, StorageConfig};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "posort")]
#[command(author, version, about = "Sorts PDF attachments out of uploaded ZIP batches by PO number")]
struct Cli {
    /// Container / bucket holding the uploaded archives
    #[arg(short, long, env = "POSORT_CONTAINER")]
    container: String,

    /// Destination folder for documents without a PO number
    #[arg(long, env = "POSORT_UNKNOWN_PO_FOLDER", default_value = "_")]
    unknown_po_folder: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("posort")
        .build();

    // Environment variables take precedence over CLI defaults
    let log_config = LogConfig::from_env(log_config)?;

    init_logging(&log_config)?;

    let storage = S3BlobStorage::new(StorageConfig::from_env()?);
    let config = AppConfig::new(cli.container, cli.unknown_po_folder);

    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after in-flight work");
            signal_token.cancel();
        }
    });

    let driver = PipelineDriver::new(Arc::new(storage), config);
    driver.run(&token).await?;

    info!("Run complete");
    Ok(())
}
