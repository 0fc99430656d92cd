#![forbid(unsafe_code)]
//! medium-core: configuration, error types, and the process-wide logger registry
//! shared by the IO layer, the conversion pipeline, and the CLI tools.

pub mod config;
pub mod error;
pub mod logging;
pub mod prelude;

pub use error::{Error, Result};
