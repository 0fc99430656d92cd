//! Streaming CSV reader producing Arrow `RecordBatch`es.
//!
//! The file is opened twice: once to infer the schema from the leading
//! records, once to stream batches under that schema. Both passes go through
//! the transcoding reader, so the tokenizer only ever sees UTF-8.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use arrow_array::RecordBatch;
use arrow_csv::reader::Format;
use arrow_csv::ReaderBuilder;
use arrow_schema::SchemaRef;

use medium_core::config::{ConvertConfig, DEFAULT_READ_BLOCK_SIZE};

use crate::decode::{open_decoded, DecodingReader};
use crate::encoding::EncodingLabel;
use crate::error::Result;

type DecodedInput = BufReader<DecodingReader<File>>;

#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub read_block_size: usize,
    pub batch_size: usize,
    pub infer_max_records: Option<usize>,
    pub delimiter: u8,
    pub has_header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            read_block_size: DEFAULT_READ_BLOCK_SIZE,
            batch_size: 8192,
            infer_max_records: Some(10_000),
            delimiter: b',',
            has_header: true,
        }
    }
}

impl CsvOptions {
    pub fn from_config(cfg: &ConvertConfig) -> Self {
        Self {
            read_block_size: cfg.read_block_size,
            batch_size: cfg.batch_size,
            infer_max_records: cfg.infer_max_records,
            delimiter: cfg.delimiter,
            has_header: cfg.has_header,
        }
    }

    fn format(&self) -> Format {
        Format::default()
            .with_header(self.has_header)
            .with_delimiter(self.delimiter)
    }
}

/// Infer the Arrow schema from at most `opts.infer_max_records` records.
pub fn infer_schema<P: AsRef<Path>>(
    path: P,
    encoding: &EncodingLabel,
    opts: &CsvOptions,
) -> Result<SchemaRef> {
    let input = open_decoded(path, encoding.encoding(), opts.read_block_size)?;
    let (schema, _records_read) = opts.format().infer_schema(input, opts.infer_max_records)?;
    Ok(Arc::new(schema))
}

pub struct CsvBatchReader {
    inner: arrow_csv::reader::BufReader<DecodedInput>,
    schema: SchemaRef,
}

impl CsvBatchReader {
    /// Infer the schema, then open a batch stream over the whole file.
    pub fn open<P: AsRef<Path>>(path: P, encoding: &EncodingLabel, opts: &CsvOptions) -> Result<Self> {
        let path = path.as_ref();
        let schema = infer_schema(path, encoding, opts)?;
        Self::open_with_schema(path, encoding, opts, schema)
    }

    pub fn open_with_schema<P: AsRef<Path>>(
        path: P,
        encoding: &EncodingLabel,
        opts: &CsvOptions,
        schema: SchemaRef,
    ) -> Result<Self> {
        let input = open_decoded(path, encoding.encoding(), opts.read_block_size)?;
        let inner = ReaderBuilder::new(schema.clone())
            .with_format(opts.format())
            .with_batch_size(opts.batch_size)
            .build_buffered(input)?;
        Ok(Self { inner, schema })
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }
}

impl Iterator for CsvBatchReader {
    type Item = Result<RecordBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|r| r.map_err(Into::into))
    }
}
