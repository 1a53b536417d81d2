//! Data layer: acquisition, lazy plans, percentile filtering, and output.
//!
//! Architecture:
//! ```text
//!  path / http(s) URL
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  fetch    │  URL → in-memory bytes (fixed UA / Referer)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  Source → LazyDataset (scan + predicates, no decoding)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  one column pass → threshold, new plan with `col > t`
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  writer   │  row-filtered batches → Parquet, temp file + rename
//!   └──────────┘
//! ```

pub mod fetch;
pub mod filter;
pub mod loader;
pub mod model;
pub mod writer;
