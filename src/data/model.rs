use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Source – where the trip records come from
// ---------------------------------------------------------------------------

/// A dataset location: a local Parquet file or an `http(s)://` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Local(PathBuf),
    Url(String),
}

impl Source {
    /// Classify a user-supplied string. Only the URL prefix is checked.
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Source::Url(s.to_string())
        } else {
            Source::Local(PathBuf::from(s))
        }
    }

    /// File stem of the local path, or of the last URL path segment.
    pub fn stem(&self) -> Option<String> {
        match self {
            Source::Local(path) => path.file_stem().map(|s| s.to_string_lossy().into_owned()),
            Source::Url(url) => {
                let parsed = reqwest::Url::parse(url).ok()?;
                let last = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
                Path::new(last)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            }
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Local(path) => write!(f, "{}", path.display()),
            Source::Url(url) => write!(f, "{url}"),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterStats – outcome of one filter pass
// ---------------------------------------------------------------------------

/// Row counts and threshold produced by one `filter_above_percentile` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilterStats {
    /// Rows in the plan before the new predicate was added.
    pub total_rows: u64,
    /// Percentile value of the column over those rows.
    pub threshold: f64,
    /// Rows strictly above `threshold`.
    pub filtered_rows: u64,
}
