//! sts-json-to-csv: Flatten Slay the Spire run history uploads into one CSV
//!
//! Searches the current directory and everything below it for `.json.gz`
//! containers and writes every kept run to `<NAME>.csv`.
//!
//! Usage:
//!   sts-json-to-csv runs
//!
//!   # Log every dropped run and every field the schema does not know
//!   RUST_LOG=debug sts-json-to-csv runs

// Use MiMalloc allocator for better performance
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use stsflat::{convert, output_path, ConvertConfig, RowWriter};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sts-json-to-csv")]
#[command(version, about = "Flatten run history uploads into a single CSV file", long_about = None)]
struct Args {
    /// Output file name without extension (".csv" is appended)
    #[arg(value_name = "NAME")]
    name: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let csv_path = output_path(&args.name)?;
    let root = std::env::current_dir().context("Failed to resolve current directory")?;
    let config = ConvertConfig::default();

    info!(
        root = %root.display(),
        output = %csv_path.display(),
        columns = config.schema.without_filtered(&config.filters).column_count(),
        "Starting conversion"
    );

    let mut writer = RowWriter::create(&csv_path)
        .with_context(|| format!("Failed to create {}", csv_path.display()))?;
    let summary = convert(&root, &mut writer, config)?;
    writer.finish().context("Failed to close output")?;

    info!(
        files = summary.files,
        records = summary.records,
        rows = summary.rows_written,
        dropped = summary.records_dropped,
        "Finished"
    );

    Ok(())
}
