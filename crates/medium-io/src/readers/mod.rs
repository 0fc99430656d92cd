//! Streaming readers.
//!
//! `csv` is the conversion source; `parquet` reads converted files back, which
//! the tests and the integration suite use to check what was written.

pub mod csv;
pub mod parquet;
