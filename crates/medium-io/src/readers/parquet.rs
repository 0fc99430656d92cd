//! Parquet read-back via `ParquetRecordBatchReaderBuilder`.

use std::fs::File;
use std::path::Path;

use arrow_array::RecordBatch;
use arrow_schema::SchemaRef;
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};

use crate::error::Result;

pub struct ParquetReader {
    inner: ParquetRecordBatchReader,
    schema: SchemaRef,
    num_rows: i64,
    num_row_groups: usize,
}

impl ParquetReader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let schema = builder.schema().clone();
        let meta = builder.metadata().file_metadata();
        let num_rows = meta.num_rows();
        let num_row_groups = builder.metadata().num_row_groups();
        let inner = builder.build()?;
        Ok(Self {
            inner,
            schema,
            num_rows,
            num_row_groups,
        })
    }

    pub fn next_batch(&mut self) -> Result<Option<RecordBatch>> {
        Ok(self.inner.next().transpose()?)
    }

    /// Drain the remaining batches.
    pub fn read_all(mut self) -> Result<Vec<RecordBatch>> {
        let mut out = Vec::new();
        while let Some(batch) = self.next_batch()? {
            out.push(batch);
        }
        Ok(out)
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    /// Row count recorded in the file footer.
    pub fn num_rows(&self) -> i64 {
        self.num_rows
    }

    pub fn num_row_groups(&self) -> usize {
        self.num_row_groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::parquet::ParquetWriter;
    use arrow_array::{ArrayRef, Int64Array, StringArray};
    use arrow_schema::{DataType, Field, Schema};
    use medium_core::config::Compression;
    use std::sync::Arc;

    fn batch(ids: &[i64], names: &[&str]) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, true),
            Field::new("name", DataType::Utf8, true),
        ]));
        let cols: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(ids.to_vec())),
            Arc::new(StringArray::from(names.to_vec())),
        ];
        RecordBatch::try_new(schema, cols).unwrap()
    }

    #[test]
    fn each_row_group_write_is_its_own_row_group() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");
        let b1 = batch(&[1, 2], &["a", "b"]);
        let b2 = batch(&[3], &["c"]);

        let mut w = ParquetWriter::to_path(&path, b1.schema(), Compression::Zstd).unwrap();
        w.write_row_group(&b1).unwrap();
        w.write_row_group(&b2).unwrap();
        assert_eq!(w.rows_written(), 3);
        w.close().unwrap();

        let r = ParquetReader::from_path(&path).unwrap();
        assert_eq!(r.num_rows(), 3);
        assert_eq!(r.num_row_groups(), 2);
        let back = r.read_all().unwrap();
        let total: usize = back.iter().map(|b| b.num_rows()).sum();
        assert_eq!(total, 3);
        assert_eq!(back[0].schema().field(1).name(), "name");
    }

    #[test]
    fn buffered_writes_share_a_row_group() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");
        let b1 = batch(&[1, 2], &["a", "b"]);
        let b2 = batch(&[3], &["c"]);

        let mut w = ParquetWriter::to_path(&path, b1.schema(), Compression::Snappy).unwrap();
        w.write_batch(&b1).unwrap();
        w.write_batch(&b2).unwrap();
        w.close().unwrap();

        let r = ParquetReader::from_path(&path).unwrap();
        assert_eq!(r.num_row_groups(), 1);
        assert_eq!(r.num_rows(), 3);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ParquetReader::from_path(dir.path().join("none.parquet")).is_err());
    }
}
