//! Conversion configuration that downstream crates can serialize/deserialize.
//!
//! Values are layered: defaults, then `MEDIUM_DATA_*` environment variables,
//! then an optional JSON config file, then CLI flags.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::logging::LogLevel;

/// Default number of bytes buffered between the input file and the tokenizer.
pub const DEFAULT_READ_BLOCK_SIZE: usize = 64 * 1024 * 1024;

/// Default number of bytes sampled for encoding detection.
pub const DEFAULT_SAMPLE_SIZE: usize = 10_000;

/// Parquet page compression codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Snappy,
    Zstd,
    Uncompressed,
}

impl FromStr for Compression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snappy" => Ok(Compression::Snappy),
            "zstd" => Ok(Compression::Zstd),
            "uncompressed" | "none" => Ok(Compression::Uncompressed),
            other => Err(Error::Config(format!("unknown compression '{other}'"))),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Compression::Snappy => "snappy",
            Compression::Zstd => "zstd",
            Compression::Uncompressed => "uncompressed",
        };
        f.write_str(s)
    }
}

/// How batches travel from the CSV reader to the Parquet writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMode {
    /// One row group per batch; memory stays bounded by the batch size.
    #[default]
    Streaming,
    /// Read the whole table first, then write it as a single row group.
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Capacity of the buffer between the input file and the CSV tokenizer.
    pub read_block_size: usize,

    /// Rows per record batch handed to the writer.
    pub batch_size: usize,

    /// Records scanned for schema inference; `None` scans the whole file.
    pub infer_max_records: Option<usize>,

    pub delimiter: u8,

    pub has_header: bool,

    /// Emit a progress line every this many batches.
    pub progress_every: u64,

    /// Bytes read from the start of the file for encoding detection.
    pub sample_size: usize,

    /// Encoding used when the sample carries no signal (empty file).
    pub fallback_encoding: String,

    pub compression: Compression,

    pub mode: ConversionMode,

    pub log_level: LogLevel,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            read_block_size: DEFAULT_READ_BLOCK_SIZE,
            batch_size: 8192,
            infer_max_records: Some(10_000),
            delimiter: b',',
            has_header: true,
            progress_every: 100,
            sample_size: DEFAULT_SAMPLE_SIZE,
            fallback_encoding: "utf-8".to_string(),
            compression: Compression::Snappy,
            mode: ConversionMode::Streaming,
            log_level: LogLevel::Info,
        }
    }
}

/// Partial configuration: every field is optional and only set fields override.
///
/// This is the shape of the JSON config file and of the CLI flag set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub read_block_size: Option<usize>,
    pub batch_size: Option<usize>,
    pub infer_max_records: Option<usize>,
    pub delimiter: Option<char>,
    pub has_header: Option<bool>,
    pub progress_every: Option<u64>,
    pub sample_size: Option<usize>,
    pub fallback_encoding: Option<String>,
    pub compression: Option<Compression>,
    pub mode: Option<ConversionMode>,
    pub log_level: Option<LogLevel>,
}

impl ConfigOverrides {
    /// Load overrides from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl ConvertConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `MEDIUM_DATA_BLOCK_SIZE`: read block size in bytes
    /// - `MEDIUM_DATA_BATCH_SIZE`: rows per batch
    /// - `MEDIUM_DATA_INFER_MAX_RECORDS`: schema inference record limit
    /// - `MEDIUM_DATA_PROGRESS_EVERY`: batches between progress lines
    /// - `MEDIUM_DATA_SAMPLE_SIZE`: encoding detection sample size
    /// - `MEDIUM_DATA_FALLBACK_ENCODING`: encoding label for empty samples
    /// - `MEDIUM_DATA_COMPRESSION`: `snappy`, `zstd` or `uncompressed`
    /// - `MEDIUM_DATA_LOG_LEVEL`: minimum log level
    ///
    /// Values that fail to parse are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConvertConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("MEDIUM_DATA_BLOCK_SIZE").and_then(|s| s.parse().ok()) {
            cfg.read_block_size = v;
        }

        if let Some(v) = lookup("MEDIUM_DATA_BATCH_SIZE").and_then(|s| s.parse().ok()) {
            cfg.batch_size = v;
        }

        if let Some(v) = lookup("MEDIUM_DATA_INFER_MAX_RECORDS").and_then(|s| s.parse().ok()) {
            cfg.infer_max_records = Some(v);
        }

        if let Some(v) = lookup("MEDIUM_DATA_PROGRESS_EVERY").and_then(|s| s.parse().ok()) {
            cfg.progress_every = v;
        }

        if let Some(v) = lookup("MEDIUM_DATA_SAMPLE_SIZE").and_then(|s| s.parse().ok()) {
            cfg.sample_size = v;
        }

        if let Some(s) = lookup("MEDIUM_DATA_FALLBACK_ENCODING") {
            cfg.fallback_encoding = s;
        }

        if let Some(v) = lookup("MEDIUM_DATA_COMPRESSION").and_then(|s| s.parse().ok()) {
            cfg.compression = v;
        }

        if let Some(v) = lookup("MEDIUM_DATA_LOG_LEVEL").and_then(|s| s.parse().ok()) {
            cfg.log_level = v;
        }

        cfg
    }

    /// Apply every field set in `overrides` on top of this config.
    pub fn apply(&mut self, overrides: &ConfigOverrides) -> Result<()> {
        if let Some(v) = overrides.read_block_size {
            self.read_block_size = v;
        }
        if let Some(v) = overrides.batch_size {
            self.batch_size = v;
        }
        if let Some(v) = overrides.infer_max_records {
            self.infer_max_records = Some(v);
        }
        if let Some(c) = overrides.delimiter {
            self.delimiter = delimiter_byte(c)?;
        }
        if let Some(v) = overrides.has_header {
            self.has_header = v;
        }
        if let Some(v) = overrides.progress_every {
            self.progress_every = v;
        }
        if let Some(v) = overrides.sample_size {
            self.sample_size = v;
        }
        if let Some(v) = &overrides.fallback_encoding {
            self.fallback_encoding = v.clone();
        }
        if let Some(v) = overrides.compression {
            self.compression = v;
        }
        if let Some(v) = overrides.mode {
            self.mode = v;
        }
        if let Some(v) = overrides.log_level {
            self.log_level = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.read_block_size == 0 {
            return Err(Error::Config("read_block_size must be > 0".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be > 0".into()));
        }
        if self.progress_every == 0 {
            return Err(Error::Config("progress_every must be > 0".into()));
        }
        if self.sample_size == 0 {
            return Err(Error::Config("sample_size must be > 0".into()));
        }
        if self.infer_max_records == Some(0) {
            return Err(Error::Config("infer_max_records must be > 0".into()));
        }
        if !self.delimiter.is_ascii() || self.delimiter == b'\n' || self.delimiter == b'\r' {
            return Err(Error::Config(format!(
                "delimiter 0x{:02x} is not usable",
                self.delimiter
            )));
        }
        Ok(())
    }
}

fn delimiter_byte(c: char) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(Error::Config(format!("delimiter '{c}' must be a single ASCII character")))
    }
}
