use std::path::{Path, PathBuf};

use crate::config::FilterConfig;
use crate::data::fetch::{Fetch, HttpFetcher};
use crate::data::filter::filter_above_percentile;
use crate::data::loader::{acquire, LazyDataset};
use crate::data::model::{FilterStats, Source};
use crate::data::writer::save;
use crate::error::{FilterError, Result};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Where a [`TripFilter`] is in its load → filter → save sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Unloaded,
    Loaded,
    Filtered,
    Persisted,
}

/// Chainable wrapper around [`acquire`], [`filter_above_percentile`] and
/// [`save`] that owns the current plan and the latest statistics.
///
/// ```no_run
/// use trip_filter::TripFilter;
///
/// let mut trips = TripFilter::new("yellow_tripdata_2024-01.parquet");
/// let written = trips
///     .load()?
///     .filter_above_percentile("trip_distance", 0.9)?
///     .save("output/yellow_tripdata_2024-01_p90.parquet")?;
/// println!("{:?} -> {}", trips.stats()?, written.display());
/// # Ok::<(), trip_filter::FilterError>(())
/// ```
pub struct TripFilter {
    source: Source,
    config: FilterConfig,
    dataset: Option<LazyDataset>,
    stats: Option<FilterStats>,
    stage: Stage,
}

impl TripFilter {
    pub fn new(source: &str) -> Self {
        Self::with_config(source, FilterConfig::default())
    }

    pub fn with_config(source: &str, config: FilterConfig) -> Self {
        Self {
            source: Source::parse(source),
            config,
            dataset: None,
            stats: None,
            stage: Stage::Unloaded,
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Acquire the source over HTTP when it is a URL, or as a lazy file scan.
    pub fn load(&mut self) -> Result<&mut Self> {
        let dataset = match &self.source {
            Source::Url(_) => acquire(&self.source, &HttpFetcher::from_config(&self.config)?)?,
            Source::Local(path) => LazyDataset::scan_file(path),
        };
        Ok(self.install(dataset))
    }

    /// Acquire the source, fetching URLs through `fetcher`.
    pub fn load_with(&mut self, fetcher: &dyn Fetch) -> Result<&mut Self> {
        let dataset = acquire(&self.source, fetcher)?;
        Ok(self.install(dataset))
    }

    fn install(&mut self, dataset: LazyDataset) -> &mut Self {
        log::debug!("loaded {}", self.source);
        self.dataset = Some(dataset.with_batch_size(self.config.batch_size));
        self.stats = None;
        self.stage = Stage::Loaded;
        self
    }

    /// The current plan. Fails with [`FilterError::NotLoaded`] before `load`.
    pub fn dataset(&self) -> Result<&LazyDataset> {
        self.dataset.as_ref().ok_or(FilterError::NotLoaded)
    }

    /// Keep rows whose `column` is strictly above its `percentile`.
    ///
    /// Calling this again filters the already filtered plan.
    pub fn filter_above_percentile(&mut self, column: &str, percentile: f64) -> Result<&mut Self> {
        let (filtered, stats) = filter_above_percentile(self.dataset()?, column, percentile)?;
        self.dataset = Some(filtered);
        self.stats = Some(stats);
        self.stage = Stage::Filtered;
        Ok(self)
    }

    /// [`filter_above_percentile`](Self::filter_above_percentile) with the
    /// column and percentile from the config.
    pub fn filter_configured(&mut self) -> Result<&mut Self> {
        let column = self.config.column.clone();
        let percentile = self.config.percentile;
        self.filter_above_percentile(&column, percentile)
    }

    /// Stream the filtered rows to `output_path`.
    pub fn save(&mut self, output_path: impl AsRef<Path>) -> Result<PathBuf> {
        let dataset = self.dataset()?;
        if self.stage < Stage::Filtered {
            return Err(FilterError::NotFiltered);
        }
        let written = save(dataset, output_path.as_ref())?;
        self.stage = Stage::Persisted;
        Ok(written)
    }

    /// Statistics of the last filter pass; `None` until one has run.
    pub fn stats(&self) -> Result<Option<FilterStats>> {
        self.dataset()?;
        Ok(self.stats)
    }

    pub fn total_rows(&self) -> Result<Option<u64>> {
        Ok(self.stats()?.map(|s| s.total_rows))
    }

    pub fn threshold(&self) -> Result<Option<f64>> {
        Ok(self.stats()?.map(|s| s.threshold))
    }

    pub fn filtered_rows(&self) -> Result<Option<u64>> {
        Ok(self.stats()?.map(|s| s.filtered_rows))
    }
}
