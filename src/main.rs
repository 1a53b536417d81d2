use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use trip_filter::{FilterConfig, TripFilter};

/// Filter trip records above the 90th percentile of trip distance.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to a local .parquet file or a URL pointing to one.
    source: String,

    /// Output parquet file path (default: output/<filename>_p90.parquet).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Numeric column to filter on.
    #[arg(long)]
    column: Option<String>,

    /// Percentile as a fraction in [0, 1].
    #[arg(long)]
    percentile: Option<f64>,

    /// Rows per record batch while streaming.
    #[arg(long)]
    batch_size: Option<usize>,

    /// Also write the row counts and threshold as JSON to this path.
    #[arg(long)]
    stats_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => FilterConfig::from_file(path)?,
        None => FilterConfig::default(),
    };
    if let Some(column) = args.column {
        config.column = column;
    }
    if let Some(percentile) = args.percentile {
        config.percentile = percentile;
    }
    if let Some(batch_size) = args.batch_size.filter(|&n| n > 0) {
        config.batch_size = batch_size;
    }

    let mut trips = TripFilter::with_config(&args.source, config);
    let output = args
        .output
        .unwrap_or_else(|| trips.config().default_output(trips.source()));

    println!("Loading: {}", args.source);
    let written = trips
        .load()?
        .filter_configured()?
        .save(&output)
        .with_context(|| format!("saving {}", output.display()))?;

    let stats = trips.stats()?.context("filter produced no statistics")?;
    let percent = (trips.config().percentile * 100.0).round();
    println!("Total rows      : {}", thousands(stats.total_rows));
    println!("P{percent} threshold   : {:.4} miles", stats.threshold);
    println!("Rows above P{percent}  : {}", thousands(stats.filtered_rows));
    println!("Output saved to : {}", written.display());

    if let Some(path) = args.stats_json {
        let json = serde_json::to_string_pretty(&stats)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing stats to {}", path.display()))?;
    }
    Ok(())
}

/// `1234567` → `"1,234,567"`.
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
