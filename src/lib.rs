//! Keep the trip records whose value in one numeric column lies strictly
//! above a percentile of that column, streaming Parquet in and out.

pub mod config;
pub mod data;
pub mod error;
pub mod processor;

pub use config::FilterConfig;
pub use data::fetch::{Fetch, HttpFetcher};
pub use data::filter::{filter_above_percentile, quantile, QuantileMethod, PERCENTILE_METHOD};
pub use data::loader::{acquire, AboveThreshold, LazyDataset};
pub use data::model::{FilterStats, Source};
pub use data::writer::save;
pub use error::{FilterError, Result};
pub use processor::{Stage, TripFilter};
