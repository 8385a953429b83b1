mod import;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use storage::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Maintenance commands that write straight to the listing database")]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://./data/jobs.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a JSON array of scraped postings.
    Import { file: PathBuf },
    /// Delete every stored posting.
    Purge,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url)
        .await
        .with_context(|| format!("failed to open {}", cli.database_url))?;

    match cli.command {
        Command::Import { file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let postings = import::parse_scraped(&raw)
                .with_context(|| format!("{} is not a JSON array of postings", file.display()))?;
            let total = postings.len();
            let report = import::import_postings(&storage, postings, Utc::now()).await?;
            info!(total, "import finished");
            println!(
                "imported={} duplicates={} invalid={}",
                report.imported, report.duplicates, report.invalid
            );
        }
        Command::Purge => {
            let removed = storage.delete_all_jobs().await?;
            println!("removed={removed}");
        }
    }

    Ok(())
}
