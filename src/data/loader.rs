use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use arrow::array::{AsArray, BooleanArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Schema, SchemaRef};
use bytes::Bytes;
use parquet::arrow::arrow_reader::{
    ArrowPredicate, ArrowPredicateFn, ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder,
    RowFilter,
};
use parquet::arrow::ProjectionMask;
use parquet::file::reader::{ChunkReader, Length};

use super::fetch::Fetch;
use super::model::Source;
use crate::error::{FilterError, Result};

const DEFAULT_BATCH_SIZE: usize = 8192;

// ---------------------------------------------------------------------------
// Acquire
// ---------------------------------------------------------------------------

/// Build a lazy handle for `source`.
///
/// Local paths are not touched until the plan is evaluated. URLs are fetched
/// in full through `fetcher`; decoding is still deferred.
pub fn acquire(source: &Source, fetcher: &dyn Fetch) -> Result<LazyDataset> {
    match source {
        Source::Local(path) => {
            log::debug!("lazy scan over {}", path.display());
            Ok(LazyDataset::scan_file(path))
        }
        Source::Url(url) => {
            let payload = fetcher.fetch(url)?;
            Ok(LazyDataset::from_bytes(payload))
        }
    }
}

// ---------------------------------------------------------------------------
// LazyDataset – unevaluated scan + predicates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum ScanSource {
    File(PathBuf),
    Memory(Bytes),
}

/// Keeps rows whose `column` value is strictly greater than `threshold`.
/// Nulls and NaNs never pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AboveThreshold {
    pub column: String,
    pub threshold: f64,
}

/// An unevaluated query plan over a Parquet source.
///
/// Adding a predicate returns a new plan. Nothing is decoded until
/// [`count`](Self::count), [`scan_column`](Self::scan_column) or
/// [`scan`](Self::scan) runs, and those stream record batches through the
/// Parquet row filter instead of loading the file.
#[derive(Debug, Clone)]
pub struct LazyDataset {
    source: ScanSource,
    predicates: Vec<AboveThreshold>,
    batch_size: usize,
}

/// Result of streaming a single column: every row is counted, only finite
/// non-null values are kept.
#[derive(Debug, Clone, Default)]
pub struct ColumnScan {
    pub total_rows: u64,
    pub values: Vec<f64>,
    /// Rows skipped because the value was null or NaN.
    pub skipped: u64,
}

impl LazyDataset {
    pub fn scan_file(path: impl AsRef<Path>) -> Self {
        Self {
            source: ScanSource::File(path.as_ref().to_path_buf()),
            predicates: Vec::new(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn from_bytes(payload: Bytes) -> Self {
        Self {
            source: ScanSource::Memory(payload),
            predicates: Vec::new(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Rows per record batch during evaluation. Zero is ignored.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        if batch_size > 0 {
            self.batch_size = batch_size;
        }
        self
    }

    /// A new plan with `predicate` appended after the existing ones.
    pub fn with_predicate(&self, predicate: AboveThreshold) -> Self {
        let mut next = self.clone();
        next.predicates.push(predicate);
        next
    }

    pub fn predicates(&self) -> &[AboveThreshold] {
        &self.predicates
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Arrow schema of the source. Reads only the footer.
    pub fn schema(&self) -> Result<SchemaRef> {
        Ok(self.open()?.schema().clone())
    }

    /// Number of rows the plan yields.
    ///
    /// Without predicates this comes straight from the footer. Otherwise only
    /// the first predicate column is decoded.
    pub fn count(&self) -> Result<u64> {
        let builder = self.open()?;
        if self.predicates.is_empty() {
            let rows = builder.metadata().file_metadata().num_rows();
            return Ok(rows.max(0) as u64);
        }

        let index = resolve_column(builder.schema(), &self.predicates[0].column)?;
        let mut rows = 0u64;
        for batch in self.build(builder, Some(index))? {
            rows += batch?.num_rows() as u64;
        }
        log::debug!("plan with {} predicate(s) yields {rows} rows", self.predicates.len());
        Ok(rows)
    }

    /// Stream one numeric column through the plan, returning its values as
    /// `f64` together with the plan's row count.
    pub fn scan_column(&self, column: &str) -> Result<ColumnScan> {
        let builder = self.open()?;
        let index = resolve_column(builder.schema(), column)?;

        let mut scan = ColumnScan::default();
        for batch in self.build(builder, Some(index))? {
            let batch = batch?;
            scan.total_rows += batch.num_rows() as u64;

            let values = cast(batch.column(0), &DataType::Float64)?;
            for value in values.as_primitive::<Float64Type>().iter() {
                match value {
                    Some(v) if !v.is_nan() => scan.values.push(v),
                    _ => scan.skipped += 1,
                }
            }
        }

        if scan.skipped > 0 {
            log::warn!(
                "column '{column}': {} of {} rows are null or NaN and were ignored",
                scan.skipped,
                scan.total_rows
            );
        }
        Ok(scan)
    }

    /// Evaluate the plan over all columns as a stream of record batches.
    pub fn scan(&self) -> Result<ParquetRecordBatchReader> {
        let builder = self.open()?;
        self.build(builder, None)
    }

    fn open(&self) -> Result<ParquetRecordBatchReaderBuilder<SourceReader>> {
        let reader = match &self.source {
            ScanSource::File(path) => {
                let file = File::open(path).map_err(|source| FilterError::SourceRead {
                    path: path.clone(),
                    source,
                })?;
                SourceReader::File(file)
            }
            ScanSource::Memory(payload) => SourceReader::Memory(payload.clone()),
        };
        Ok(ParquetRecordBatchReaderBuilder::try_new(reader)?)
    }

    /// Attach the row filter and an optional single-column projection.
    fn build(
        &self,
        builder: ParquetRecordBatchReaderBuilder<SourceReader>,
        column: Option<usize>,
    ) -> Result<ParquetRecordBatchReader> {
        let mut builder = builder.with_batch_size(self.batch_size);

        if let Some(index) = column {
            let mask = ProjectionMask::roots(builder.parquet_schema(), [index]);
            builder = builder.with_projection(mask);
        }

        if !self.predicates.is_empty() {
            let mut predicates: Vec<Box<dyn ArrowPredicate>> =
                Vec::with_capacity(self.predicates.len());
            for predicate in &self.predicates {
                let index = resolve_column(builder.schema(), &predicate.column)?;
                let mask = ProjectionMask::roots(builder.parquet_schema(), [index]);
                let threshold = predicate.threshold;
                predicates.push(Box::new(ArrowPredicateFn::new(mask, move |batch| {
                    let values = cast(batch.column(0), &DataType::Float64)?;
                    // IEEE comparison: NaN is never above the threshold
                    Ok(values
                        .as_primitive::<Float64Type>()
                        .iter()
                        .map(|v| v.map(|v| v > threshold))
                        .collect::<BooleanArray>())
                })));
            }
            builder = builder.with_row_filter(RowFilter::new(predicates));
        }

        Ok(builder.build()?)
    }
}

/// Index of `column` in `schema`, which must hold a numeric type.
fn resolve_column(schema: &Schema, column: &str) -> Result<usize> {
    let index = schema
        .index_of(column)
        .map_err(|_| FilterError::ColumnNotFound {
            column: column.to_string(),
        })?;
    let data_type = schema.field(index).data_type();
    if !data_type.is_numeric() {
        return Err(FilterError::NonNumericColumn {
            column: column.to_string(),
            data_type: data_type.clone(),
        });
    }
    Ok(index)
}

// ---------------------------------------------------------------------------
// SourceReader – one ChunkReader over either backing store
// ---------------------------------------------------------------------------

enum SourceReader {
    File(File),
    Memory(Bytes),
}

impl Length for SourceReader {
    fn len(&self) -> u64 {
        match self {
            SourceReader::File(file) => Length::len(file),
            SourceReader::Memory(payload) => payload.len() as u64,
        }
    }
}

impl ChunkReader for SourceReader {
    type T = Box<dyn Read + Send>;

    fn get_read(&self, start: u64) -> parquet::errors::Result<Self::T> {
        Ok(match self {
            SourceReader::File(file) => Box::new(file.get_read(start)?),
            SourceReader::Memory(payload) => Box::new(payload.get_read(start)?),
        })
    }

    fn get_bytes(&self, start: u64, length: usize) -> parquet::errors::Result<Bytes> {
        match self {
            SourceReader::File(file) => file.get_bytes(start, length),
            SourceReader::Memory(payload) => payload.get_bytes(start, length),
        }
    }
}
