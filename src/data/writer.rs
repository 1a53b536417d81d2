use std::fs;
use std::path::{Path, PathBuf};

use arrow::record_batch::RecordBatchReader;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use super::loader::LazyDataset;
use crate::error::{FilterError, Result};

/// Evaluate `dataset` and write its rows to `output_path` as Parquet.
///
/// Record batches flow from the reader's row filter straight into the
/// writer, so only one batch (plus the writer's open row group) is resident
/// at a time. Output goes to a temporary file beside `output_path` that is
/// renamed into place once the footer is written; a failed run leaves no
/// partial file behind. Missing parent directories are created.
pub fn save(dataset: &LazyDataset, output_path: &Path) -> Result<PathBuf> {
    let parent = match output_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|source| FilterError::IoWrite {
        path: parent.to_path_buf(),
        source,
    })?;

    let reader = dataset.scan()?;
    let schema = reader.schema();

    let staging = tempfile::Builder::new()
        .prefix(".trip-filter-")
        .suffix(".parquet.tmp")
        .tempfile_in(parent)
        .map_err(|source| FilterError::IoWrite {
            path: parent.to_path_buf(),
            source,
        })?;
    let encode = |source| FilterError::ParquetWrite {
        path: output_path.to_path_buf(),
        source,
    };

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(staging, schema, Some(props)).map_err(encode)?;

    let mut rows = 0usize;
    for batch in reader {
        let batch = batch?;
        rows += batch.num_rows();
        writer.write(&batch).map_err(encode)?;
    }
    let staging = writer.into_inner().map_err(encode)?;

    staging
        .persist(output_path)
        .map_err(|e| FilterError::IoWrite {
            path: output_path.to_path_buf(),
            source: e.error,
        })?;

    log::info!("wrote {rows} rows to {}", output_path.display());
    Ok(output_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, RecordBatch};
    use arrow::datatypes::{DataType, Field, Schema};
    use bytes::Bytes;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use super::*;
    use crate::data::loader::AboveThreshold;

    fn sample_plan() -> LazyDataset {
        let schema = Arc::new(Schema::new(vec![
            Field::new("trip_distance", DataType::Float64, false),
            Field::new("passenger_count", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from_iter_values((1..=30).map(f64::from))),
                Arc::new(Int64Array::from(vec![2; 30])),
            ],
        )
        .unwrap();
        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        LazyDataset::from_bytes(Bytes::from(buf))
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested/deeper/out.parquet");
        let plan = sample_plan().with_predicate(AboveThreshold {
            column: "trip_distance".to_string(),
            threshold: 25.0,
        });

        let written = save(&plan, &output).unwrap();
        assert_eq!(written, output);

        let file = std::fs::File::open(&output).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let rows: usize = reader.map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(rows, 5);
    }

    #[test]
    fn failed_save_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.parquet");
        let plan = LazyDataset::from_bytes(Bytes::from_static(b"garbage"));

        assert!(save(&plan, &output).is_err());
        assert!(!output.exists());
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.parquet");
        std::fs::write(&output, b"stale").unwrap();

        save(&sample_plan(), &output).unwrap();
        let file = std::fs::File::open(&output).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        assert_eq!(builder.metadata().file_metadata().num_rows(), 30);
    }
}
