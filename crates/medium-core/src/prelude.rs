//! Convenient re-exports for downstream crates.

pub use crate::config::{Compression, ConfigOverrides, ConversionMode, ConvertConfig};
pub use crate::error::{Error, Result};
pub use crate::logging::{get_logger, LogLevel, Logger};
