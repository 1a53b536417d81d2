use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

/// Write a synthetic yellow-taxi style parquet file for trying out `trip-filter`.
#[derive(Debug, Parser)]
struct Args {
    /// Destination file.
    #[arg(default_value = "sample_trips.parquet")]
    output: PathBuf,

    /// Number of trips to generate.
    #[arg(long, default_value_t = 100_000)]
    rows: usize,

    /// Rows per parquet row group.
    #[arg(long, default_value_t = 16_384)]
    row_group_size: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Exponential sample via inverse transform.
    fn exponential(&mut self, mean: f64) -> f64 {
        -mean * (1.0 - self.next_f64()).max(1e-15).ln()
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

struct Trip {
    vendor: &'static str,
    passenger_count: Option<i64>,
    trip_distance: f64,
    fare_amount: f64,
    payment_type: &'static str,
}

fn generate_trip(rng: &mut SimpleRng) -> Trip {
    // mostly short hops, with a long tail of airport runs
    let trip_distance = if rng.next_f64() < 0.08 {
        15.0 + rng.exponential(5.0)
    } else {
        0.3 + rng.exponential(2.2)
    };
    let trip_distance = (trip_distance * 100.0).round() / 100.0;
    let fare_amount = ((3.0 + trip_distance * 2.5 + rng.exponential(1.5)) * 100.0).round() / 100.0;

    // unknown passenger counts show up as nulls in the real data
    let passenger_count = if rng.next_f64() < 0.02 {
        None
    } else {
        Some(1 + (rng.next_u64() % 4) as i64)
    };

    Trip {
        vendor: rng.pick(&["CMT", "VTS"]),
        passenger_count,
        trip_distance,
        fare_amount,
        payment_type: rng.pick(&["card", "cash", "card", "card", "dispute"]),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    let trips: Vec<Trip> = (0..args.rows).map(|_| generate_trip(&mut rng)).collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("vendor", DataType::Utf8, false),
        Field::new("passenger_count", DataType::Int64, true),
        Field::new("trip_distance", DataType::Float64, false),
        Field::new("fare_amount", DataType::Float64, false),
        Field::new("payment_type", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(trips.iter().map(|t| t.vendor))),
            Arc::new(Int64Array::from_iter(trips.iter().map(|t| t.passenger_count))),
            Arc::new(Float64Array::from_iter_values(trips.iter().map(|t| t.trip_distance))),
            Arc::new(Float64Array::from_iter_values(trips.iter().map(|t| t.fare_amount))),
            Arc::new(StringArray::from_iter_values(trips.iter().map(|t| t.payment_type))),
        ],
    )
    .context("building record batch")?;

    if let Some(dir) = args.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = std::fs::File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let props = WriterProperties::builder()
        .set_max_row_group_size(args.row_group_size.max(1))
        .build();
    let mut writer =
        ArrowWriter::try_new(file, schema, Some(props)).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;

    println!("Wrote {} trips to {}", args.rows, args.output.display());
    Ok(())
}
