use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::model::Source;
use crate::error::{FilterError, Result};

/// Column filtered on when none is given.
pub const DEFAULT_COLUMN: &str = "trip_distance";
/// Fraction of sorted values that fall at or below the threshold.
pub const DEFAULT_PERCENTILE: f64 = 0.9;

// Some open-data hosts reject requests without a browser-like identity.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
pub const DEFAULT_REFERER: &str = "https://www.nyc.gov/";

// ---------------------------------------------------------------------------
// FilterConfig – tunables shared by the library and the CLI
// ---------------------------------------------------------------------------

/// Run configuration. Every field has a default, so a JSON config file only
/// needs the keys it wants to override.
///
/// ```json
/// { "column": "fare_amount", "percentile": 0.95, "batch_size": 65536 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub column: String,
    pub percentile: f64,
    /// Directory used for derived output paths.
    pub output_dir: PathBuf,
    /// Appended to the source stem when deriving the output file name.
    pub output_suffix: String,
    pub user_agent: String,
    pub referer: String,
    /// Rows per record batch while streaming.
    pub batch_size: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            column: DEFAULT_COLUMN.to_string(),
            percentile: DEFAULT_PERCENTILE,
            output_dir: PathBuf::from("output"),
            output_suffix: "_p90".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            batch_size: 8192,
        }
    }
}

impl FilterConfig {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| FilterError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: FilterConfig =
            serde_json::from_str(&text).map_err(|e| FilterError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        if config.batch_size == 0 {
            return Err(FilterError::Config {
                path: path.to_path_buf(),
                message: "batch_size must be greater than zero".to_string(),
            });
        }
        log::debug!("loaded config from {}: {config:?}", path.display());
        Ok(config)
    }

    /// `<output_dir>/<stem><output_suffix>.parquet`, where the stem comes from
    /// the local file name or the last segment of the URL path.
    pub fn default_output(&self, source: &Source) -> PathBuf {
        let stem = source.stem().unwrap_or_else(|| "output".to_string());
        self.output_dir
            .join(format!("{stem}{}.parquet", self.output_suffix))
    }
}
