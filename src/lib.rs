#![forbid(unsafe_code)]
//! medium-data: convert delimited text files to Parquet, detecting the input
//! encoding first.
//!
//! This crate re-exports the workspace members under one roof:
//!
//! - [`medium_core`]: configuration, errors, the logger registry
//! - [`medium_io`]: encoding detection, transcoding, CSV and Parquet readers/writers
//! - [`medium_exec`]: the conversion pipeline
//!
//! ```no_run
//! use medium_data::prelude::*;
//!
//! let cfg = ConvertConfig::default();
//! let encoding = detect_encoding("input.csv", &DetectOptions::from_config(&cfg)).unwrap();
//! let outcome = convert_csv_to_parquet("input.csv", "output.parquet", &encoding, &cfg);
//! assert!(outcome.is_success(), "{}", outcome.message());
//! ```

pub use medium_core;
pub use medium_exec;
pub use medium_io;

pub mod prelude {
    pub use medium_core::prelude::*;
    pub use medium_exec::{
        convert_csv_to_parquet, convert_in_memory, convert_with_mode, ConversionOutcome,
        ConversionReport,
    };
    pub use medium_io::{
        detect_encoding, resolve_label, CsvBatchReader, CsvOptions, DetectOptions,
        DetectionSource, EncodingLabel, ParquetReader, ParquetWriter,
    };
}
