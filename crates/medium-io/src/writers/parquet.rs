//! Parquet sink built on `parquet::arrow::ArrowWriter`.
//!
//! `write_row_group` flushes after every batch so each input batch becomes its
//! own row group. `write_batch` only buffers, letting the writer size row
//! groups itself.

use std::fs::File;
use std::path::Path;

use arrow_array::RecordBatch;
use arrow_schema::SchemaRef;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression as ParquetCompression, ZstdLevel};
use parquet::file::properties::WriterProperties;

use medium_core::config::Compression;

use crate::error::Result;

pub struct ParquetWriter {
    inner: ArrowWriter<File>,
    rows_written: usize,
}

impl ParquetWriter {
    /// Create (or truncate) `path` and prepare a writer for `schema`.
    pub fn to_path<P: AsRef<Path>>(
        path: P,
        schema: SchemaRef,
        compression: Compression,
    ) -> Result<Self> {
        let file = File::create(path)?;
        let inner = ArrowWriter::try_new(file, schema, Some(writer_properties(compression)))?;
        Ok(Self {
            inner,
            rows_written: 0,
        })
    }

    pub fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        self.inner.write(batch)?;
        self.rows_written += batch.num_rows();
        Ok(())
    }

    /// Write `batch` and close the current row group.
    pub fn write_row_group(&mut self, batch: &RecordBatch) -> Result<()> {
        self.write_batch(batch)?;
        self.inner.flush()?;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Write the footer and release the file.
    pub fn close(self) -> Result<()> {
        self.inner.close()?;
        Ok(())
    }
}

fn writer_properties(compression: Compression) -> WriterProperties {
    let codec = match compression {
        Compression::Snappy => ParquetCompression::SNAPPY,
        Compression::Zstd => ParquetCompression::ZSTD(ZstdLevel::default()),
        Compression::Uncompressed => ParquetCompression::UNCOMPRESSED,
    };
    WriterProperties::builder().set_compression(codec).build()
}
