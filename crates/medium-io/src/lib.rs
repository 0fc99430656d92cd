#![forbid(unsafe_code)]
//! medium-io: the byte-level side of a conversion.
//!
//! - `encoding`: sample-based encoding detection and label resolution.
//! - `decode`: a `Read` adapter that transcodes any supported encoding to UTF-8.
//! - `readers`: streaming CSV batches and Parquet read-back.
//! - `writers`: the Parquet sink.

pub mod decode;
pub mod encoding;
pub mod error;
pub mod readers;
pub mod writers;

pub use encoding::{detect_encoding, resolve_label, DetectOptions, DetectionSource, EncodingLabel};
pub use error::{Error, Result};
pub use readers::csv::{CsvBatchReader, CsvOptions};
pub use readers::parquet::ParquetReader;
pub use writers::parquet::ParquetWriter;
