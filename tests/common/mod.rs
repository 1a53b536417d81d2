#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, Float64Array, Int64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

/// `trip_distance` = 1..=100 (in a scrambled order), `passenger_count` = 1.
pub fn sample_batch() -> RecordBatch {
    let distances: Vec<f64> = (1..=100).map(|v| ((v * 37) % 100 + 1) as f64).collect();
    distance_batch(distances)
}

pub fn distance_batch(distances: Vec<f64>) -> RecordBatch {
    let n = distances.len();
    let schema = Arc::new(Schema::new(vec![
        Field::new("trip_distance", DataType::Float64, false),
        Field::new("passenger_count", DataType::Int64, false),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Float64Array::from(distances)),
            Arc::new(Int64Array::from(vec![1; n])),
        ],
    )
    .unwrap()
}

/// Encode `batch` as parquet with small row groups.
pub fn parquet_bytes(batch: &RecordBatch) -> Bytes {
    let props = WriterProperties::builder()
        .set_max_row_group_size(32)
        .build();
    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), Some(props)).unwrap();
    writer.write(batch).unwrap();
    writer.close().unwrap();
    Bytes::from(buf)
}

pub fn write_parquet(dir: &Path, name: &str, batch: &RecordBatch) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, parquet_bytes(batch)).unwrap();
    path
}

/// Read back every `trip_distance` value of a parquet file.
pub fn read_distances(path: &Path) -> Vec<f64> {
    let file = std::fs::File::open(path).unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();
    let mut out = Vec::new();
    for batch in reader {
        let batch = batch.unwrap();
        let column = batch
            .column_by_name("trip_distance")
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        out.extend(column.values().iter().copied());
    }
    out
}
