use std::path::PathBuf;

use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

/// Errors raised while acquiring, filtering or persisting a trip dataset.
///
/// Nothing is retried internally: every variant propagates to the caller
/// unchanged.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The dataset handle was accessed before `load()`.
    #[error("Data not loaded. Call load() first.")]
    NotLoaded,

    /// `save()` was called on a loaded but unfiltered session.
    #[error("Data not filtered. Call filter_above_percentile() first.")]
    NotFiltered,

    /// The HTTP request for a remote source could not be completed.
    #[error("Failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote source answered with a non-success status.
    #[error("Fetching {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// Column not present in the dataset schema
    #[error("Column '{column}' not found in schema")]
    ColumnNotFound { column: String },

    /// Column exists but cannot be compared against a float threshold
    #[error("Column '{column}' has non-numeric type {data_type:?}")]
    NonNumericColumn { column: String, data_type: DataType },

    /// The column holds no non-null values, so the percentile is undefined.
    #[error("No data: column '{column}' has no non-null values to compute a percentile from")]
    EmptyDataset { column: String },

    #[error("Percentile must be within [0, 1], got {0}")]
    InvalidPercentile(f64),

    /// A local source file could not be opened when the plan was evaluated.
    #[error("Cannot read source {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The payload is not valid Parquet. Surfaces on first evaluation.
    #[error("Malformed input: {0}")]
    MalformedInput(#[from] ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Creating or writing the output file failed.
    #[error("Failed to write {path}: {source}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding the output Parquet file failed.
    #[error("Failed to encode parquet output {path}: {source}")]
    ParquetWrite {
        path: PathBuf,
        #[source]
        source: ParquetError,
    },

    #[error("Invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },
}
