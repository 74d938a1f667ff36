use std::path::PathBuf;
use thiserror::Error;

/// Problems found while building a [`crate::flatten::Schema`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema entry has an empty key")]
    EmptyKey,

    #[error("duplicate schema key '{0}'")]
    DuplicateKey(String),

    #[error("field '{key}' declares an empty sub-field name")]
    EmptySubField { key: String },

    #[error("field '{key}' declares sub-field '{sub_field}' more than once")]
    DuplicateSubField { key: String, sub_field: String },
}

/// A record whose shape contradicts the schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlattenError {
    /// A complex field held something other than a mapping or a list of mappings.
    #[error("complex field '{key}' holds {found}, expected an object or a list of objects")]
    NotComplex { key: String, found: &'static str },

    /// One element of a complex field list was not a mapping.
    #[error("element {index} of complex field '{key}' is {found}, expected an object")]
    ElementNotObject {
        key: String,
        index: usize,
        found: &'static str,
    },
}

/// Failures locating or reading container files.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to walk directory tree under {root}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to open {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decompress {path}")]
    Decompress {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a JSON array of event envelopes")]
    Parse {
        path: PathBuf,
        #[source]
        source: simd_json::Error,
    },
}

/// Failures writing the output table.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("header rows have already been written")]
    HeadersAlreadyWritten,

    #[error("data row written before header rows")]
    HeadersMissing,

    #[error("row has {found} cells but the header has {expected}")]
    WidthMismatch { expected: usize, found: usize },
}

/// Invalid command-line configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("output name must not be empty")]
    EmptyOutputName,

    #[error("output name '{0}' must not end with a path separator")]
    DirectoryOutputName(String),
}
