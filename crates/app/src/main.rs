//! Command-line front end for turning receipt OCR output into pantry items.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::{ExtractArgs, MaterialsArgs, ScanArgs};

/// Read purchased items off Korean grocery receipts
#[derive(Parser)]
#[command(name = "pantry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML extraction config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Run one pass at the default row tolerance instead of the retry sequence
    #[arg(long, global = true)]
    single_pass: bool,

    /// Run a single pass at this row tolerance instead of the retry sequence
    #[arg(long, global = true)]
    row_tolerance: Option<f64>,

    /// Horizontal tolerance for matching numbers to header columns
    #[arg(long, global = true)]
    column_tolerance: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract line items from a saved OCR response
    Extract(ExtractArgs),

    /// Extract line items and print them as material drafts
    Materials(MaterialsArgs),

    /// Run a receipt image through the pipeline, answering OCR with a saved response
    Scan(ScanArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = commands::load_config(
        cli.config.as_deref(),
        cli.single_pass,
        cli.row_tolerance,
        cli.column_tolerance,
    )?;

    match cli.command {
        Commands::Extract(args) => commands::extract(args, config),
        Commands::Materials(args) => commands::materials(args, config),
        Commands::Scan(args) => commands::scan(args, config).await,
    }
}
