//! # stsflat - Run History Flattener
//!
//! Turns a directory tree of gzip'd Slay the Spire run-history uploads into a
//! single CSV table with a fixed, declared column layout.
//!
//! ## Modules
//!
//! - **flatten**: schema, filter rules, the record flattener and the CSV row writer
//! - **source**: finds `.json.gz` containers and decodes the run records inside
//!
//! ## Quick Start
//!
//! ```rust
//! use stsflat::flatten::{Flattened, Flattener, FilterSet, Schema, SchemaEntry};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let schema = Schema::new(vec![
//!     SchemaEntry::scalar("victory", "Victory"),
//!     SchemaEntry::complex("relics_obtained", "Relics Obtained", &["floor", "key"]),
//! ])?;
//! let flattener = Flattener::new(schema, FilterSet::default());
//!
//! let run = json!({
//!     "victory": true,
//!     "relics_obtained": [{"floor": 1, "key": "Boot"}, {"floor": 3, "key": "Vajra"}]
//! });
//! let row = flattener.flatten(run.as_object().unwrap())?;
//!
//! assert_eq!(row, Flattened::Row(vec!["True".into(), "1; 3".into(), "Boot; Vajra".into()]));
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub mod error;
pub mod flatten;
pub mod source;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{ConfigError, EmitError, FlattenError, SchemaError, SourceError};
pub use flatten::{FilterRule, FilterSet, Flattened, Flattener, RowWriter, Schema, SchemaEntry};
pub use types::{ConvertConfig, RunSummary};

/// Derive the CSV path from an output base name
pub fn output_path(name: &str) -> Result<PathBuf, ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::EmptyOutputName);
    }
    if name.ends_with('/') || name.ends_with(std::path::MAIN_SEPARATOR) {
        return Err(ConfigError::DirectoryOutputName(name.to_string()));
    }

    Ok(PathBuf::from(format!("{}.csv", name)))
}

/// Main entry point: flatten every container under `root` into `writer`.
///
/// Headers are written first. Any unreadable container or malformed record
/// aborts the run; rows already written stay in the sink.
pub fn convert<W: Write>(
    root: &Path,
    writer: &mut RowWriter<W>,
    config: ConvertConfig,
) -> Result<RunSummary> {
    let flattener = Flattener::new(config.schema, config.filters);
    writer
        .write_headers(flattener.schema())
        .context("Failed to write header rows")?;

    let mut summary = RunSummary::default();
    let mut reported_unknown: HashSet<String> = HashSet::new();

    for path in source::enumerate(root, &config.suffix) {
        let path = path?;
        let records = source::read_container(&path)?;
        info!(file = %path.display(), records = records.len(), "Reading container");

        for record in records {
            summary.records += 1;

            for key in flattener.unknown_keys(&record) {
                if reported_unknown.insert(key.to_string()) {
                    debug!(key = %key, "Field not in schema");
                }
            }

            match flattener
                .flatten(&record)
                .with_context(|| format!("Failed to flatten record in {}", path.display()))?
            {
                Flattened::Row(row) => {
                    writer.write_row(&row).context("Failed to write row")?;
                }
                Flattened::Dropped { key } => {
                    debug!(file = %path.display(), key = %key, "Dropped filtered run");
                    summary.records_dropped += 1;
                }
            }
        }

        summary.files += 1;
    }

    writer.flush().context("Failed to flush output")?;
    summary.rows_written = writer.rows_written();
    Ok(summary)
}
