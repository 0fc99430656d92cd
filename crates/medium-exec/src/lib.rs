#![forbid(unsafe_code)]
//! medium-exec: the conversion pipeline.
//!
//! `pipeline` streams CSV batches into a Parquet file (or loads the whole
//! table first, in the in-memory mode) and folds every failure into a
//! `ConversionOutcome` instead of returning an error.

pub mod outcome;
pub mod pipeline;
pub mod progress;

pub use outcome::{ConversionOutcome, ConversionReport};
pub use pipeline::{convert_csv_to_parquet, convert_in_memory, convert_with_mode, ExecError};
