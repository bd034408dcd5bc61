// src/dataset.rs

use anyhow::{Context, Result};
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use regex::Regex;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Column names of imports-85, in file order. The source has no header row.
pub const COLUMN_NAMES: [&str; 26] = [
    "symboling",
    "normalized_losses",
    "make",
    "fuel_type",
    "aspiration",
    "num_doors",
    "body_style",
    "drive_wheels",
    "engine_location",
    "wheel_base",
    "length",
    "width",
    "height",
    "curb_weight",
    "engine_type",
    "num_cylinders",
    "engine_size",
    "fuel_system",
    "bore",
    "stroke",
    "compression_ratio",
    "horsepower",
    "peak_rpm",
    "city_mpg",
    "highway_mpg",
    "price",
];

/// Sentinel the source uses for an absent value.
pub const MISSING_TOKEN: &str = "?";

/// Closest thing the table has to a loss ratio.
pub const TARGET_COLUMN: &str = "normalized_losses";

const BATCH_SIZE: usize = 8_192;

/// All columns as nullable text; values pass through untouched apart from
/// the missing-value sentinel.
pub fn schema() -> SchemaRef {
    let fields: Vec<Field> = COLUMN_NAMES
        .iter()
        .map(|name| Field::new(*name, DataType::Utf8, true))
        .collect();
    Arc::new(Schema::new(fields))
}

fn missing_value_regex() -> Result<Regex> {
    Regex::new(&format!("^{}$", regex::escape(MISSING_TOKEN)))
        .context("compiling missing-value pattern")
}

/// The automobile table, held as Arrow batches between download and write.
#[derive(Debug)]
pub struct AutomobileTable {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl AutomobileTable {
    /// Parse comma-separated rows positionally against [`COLUMN_NAMES`].
    ///
    /// Fields equal to [`MISSING_TOKEN`] become nulls. A row with the wrong
    /// number of fields fails the whole parse. Set `has_header` when reading a
    /// file this module wrote; the remote source has none.
    pub fn parse<R: Read>(reader: R, has_header: bool) -> Result<Self> {
        let schema = schema();
        let csv_reader = ReaderBuilder::new(schema.clone())
            .with_header(has_header)
            .with_null_regex(missing_value_regex()?)
            .with_batch_size(BATCH_SIZE)
            .build(reader)
            .context("Failed to create Arrow CSV reader")?;

        let mut batches = Vec::new();
        for batch_result in csv_reader {
            let batch = batch_result.context("reading CSV batch")?;
            debug!(rows = batch.num_rows(), "parsed batch");
            batches.push(batch);
        }

        Ok(Self { schema, batches })
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Write a header row followed by every data row; nulls become empty
    /// fields. The rows go to `<path>.tmp` first and are renamed into place,
    /// so `path` is either the old file or the complete new one.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = tmp_path_for(path);

        if let Err(e) = self.write_csv_to(&tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        fs::rename(&tmp_path, path)
            .with_context(|| format!("renaming {} to {}", tmp_path.display(), path.display()))?;

        debug!(rows = self.num_rows(), path = %path.display(), "wrote table");
        Ok(())
    }

    fn write_csv_to(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = WriterBuilder::new()
            .with_header(true)
            .build(BufWriter::new(file));

        if self.batches.is_empty() {
            // the header is emitted on the first write, even for zero rows
            writer
                .write(&RecordBatch::new_empty(self.schema.clone()))
                .context("writing CSV header")?;
        }
        for batch in &self.batches {
            writer.write(batch).context("writing CSV batch")?;
        }

        let mut out = writer.into_inner();
        out.flush()
            .with_context(|| format!("flushing {}", path.display()))?;
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
