//! Locating and decoding gzip'd run-history containers
//!
//! A container is a gzip file whose payload is a JSON array of envelopes,
//! each holding one run record under the `event` key.

use crate::error::SourceError;
use flate2::read::GzDecoder;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File suffix of run-history containers
pub const CONTAINER_SUFFIX: &str = ".json.gz";

/// One element of a container's top-level array
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub event: Map<String, Value>,
}

/// Recursively list files under `root` whose name ends with `suffix`.
///
/// Symlinks to files are listed; directory symlinks are not descended into.
pub fn enumerate<'a>(
    root: &'a Path,
    suffix: &'a str,
) -> impl Iterator<Item = Result<PathBuf, SourceError>> + 'a {
    WalkDir::new(root)
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) => {
                let file_type = entry.file_type();
                let is_file = file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
                let matched = is_file && entry.file_name().to_string_lossy().ends_with(suffix);
                matched.then(|| Ok(entry.into_path()))
            }
            Err(source) => Some(Err(SourceError::Walk {
                root: root.to_path_buf(),
                source,
            })),
        })
}

/// Decompress and parse one container into its records
pub fn read_container(path: &Path) -> Result<Vec<Map<String, Value>>, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut content = Vec::new();
    GzDecoder::new(BufReader::new(file))
        .read_to_end(&mut content)
        .map_err(|source| SourceError::Decompress {
            path: path.to_path_buf(),
            source,
        })?;

    let envelopes: Vec<Envelope> =
        simd_json::serde::from_slice(&mut content).map_err(|source| SourceError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(envelopes.into_iter().map(|e| e.event).collect())
}
