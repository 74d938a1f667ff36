use crate::flatten::{FilterSet, Schema};
use crate::source::CONTAINER_SUFFIX;

/// Configuration for a conversion run
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Column layout before filtered fields are removed
    pub schema: Schema,

    /// Runs to drop; their keys never become columns
    pub filters: FilterSet,

    /// File name suffix of the containers to read
    pub suffix: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        ConvertConfig {
            schema: Schema::sts_runs(),
            filters: FilterSet::sts_defaults(),
            suffix: String::from(CONTAINER_SUFFIX),
        }
    }
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files: u64,
    pub records: u64,
    pub rows_written: u64,
    pub records_dropped: u64,
}
