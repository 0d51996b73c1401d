//! Roster CLI: run the HTTP service or ingest a spreadsheet from disk.
//!
//! ```bash
//! roster serve --port 8080
//! roster import staff.xlsx --mapping 6f1c...
//! roster mapping list
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use roster_core::config::RosterConfig;
use roster_core::http::RosterServer;
use roster_core::ingest::{reader, IngestPipeline};
use roster_core::logging::init_logging;
use roster_core::mapping::MappingReconciler;
use roster_core::store::open_store;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "roster", about = "Employee roster spreadsheet ingestion", version)]
struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP service
    Serve {
        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        host: Option<String>,
    },
    /// Ingest a CSV or workbook file into the store
    Import {
        file: PathBuf,

        /// Fold new columns into this existing mapping instead of creating one
        #[arg(long)]
        mapping: Option<String>,

        /// Read every sheet of a workbook instead of only the first
        #[arg(long)]
        all_sheets: bool,
    },
    /// Inspect column mappings
    Mapping {
        #[command(subcommand)]
        command: MappingCommands,
    },
}

#[derive(Subcommand)]
enum MappingCommands {
    /// Print every stored mapping
    List,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => RosterConfig::load_from(path)?,
        None => RosterConfig::load()?,
    };
    init_logging(&config.logging)?;

    if let Commands::Serve { port, host } = &cli.command {
        if let Some(port) = port {
            config.server.port = *port;
        }
        if let Some(host) = host {
            config.server.host = host.clone();
        }
    }
    config.validate()?;

    match cli.command {
        Commands::Serve { .. } => {
            let store = open_store(&config.storage)?;
            RosterServer::new(config, store).serve().await
        }
        Commands::Import { file, mapping, all_sheets } => {
            import(config, &file, mapping.as_deref(), all_sheets).await
        }
        Commands::Mapping { command: MappingCommands::List } => {
            let store = open_store(&config.storage)?;
            let mappings = MappingReconciler::new(store).list().await?;
            let listing: Vec<_> = mappings.iter().map(|m| m.to_listing()).collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
            Ok(())
        }
    }
}

async fn import(
    config: RosterConfig,
    file: &Path,
    mapping: Option<&str>,
    all_sheets: bool,
) -> anyhow::Result<()> {
    let all_sheets = all_sheets || config.ingest.all_sheets;
    let source = reader::read_path(file, &config.ingest.allowed_extensions, all_sheets)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let filename = file.file_name().and_then(|n| n.to_str()).unwrap_or("upload");

    let store = open_store(&config.storage)?;
    let pipeline = IngestPipeline::new(store, config.ingest);
    let report = pipeline.ingest_source(filename, &source, mapping).await?;
    log::info!("Imported {} rows from {}", report.file_info.rows, file.display());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
